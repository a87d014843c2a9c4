use crate::domain::model::{PetRecord, RenderedList};
use crate::utils::error::Result;
use askama::Template;

// askama 的 html 模板會自動跳脫 name/breed 內的 <、>、& 等字元
#[derive(Template)]
#[template(
    source = "{% for pet in pets %}<p>{{ pet.name }} - {{ pet.breed }}</p>{% endfor %}",
    ext = "html"
)]
struct PetListTemplate<'a> {
    pets: &'a [PetRecord],
}

#[derive(Template)]
#[template(source = r#"<p class="pets-error">{{ message }}</p>"#, ext = "html")]
struct FallbackTemplate<'a> {
    message: &'a str,
}

/// One `<p>name - breed</p>` block per record, concatenated in order.
pub fn render_pet_list(pets: &[PetRecord]) -> Result<RenderedList> {
    let markup = PetListTemplate { pets }.render()?;
    Ok(RenderedList {
        markup,
        record_count: pets.len(),
    })
}

pub fn render_fallback(message: &str) -> Result<RenderedList> {
    let markup = FallbackTemplate { message }.render()?;
    Ok(RenderedList {
        markup,
        record_count: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_blocks_in_order() {
        let pets = vec![
            PetRecord::new("Rex", "Labrador"),
            PetRecord::new("Mimi", "Siamese"),
        ];

        let rendered = render_pet_list(&pets).unwrap();

        assert_eq!(
            rendered.markup,
            "<p>Rex - Labrador</p><p>Mimi - Siamese</p>"
        );
        assert_eq!(rendered.record_count, 2);
    }

    #[test]
    fn test_render_empty_collection() {
        let rendered = render_pet_list(&[]).unwrap();

        assert_eq!(rendered.markup, "");
        assert_eq!(rendered.record_count, 0);
    }

    #[test]
    fn test_markup_in_fields_is_escaped() {
        let pets = vec![PetRecord::new("<script>alert(1)</script>", "Tom & Jerry")];

        let rendered = render_pet_list(&pets).unwrap();

        assert_eq!(
            rendered.markup,
            "<p>&#60;script&#62;alert(1)&#60;/script&#62; - Tom &#38; Jerry</p>"
        );
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let rendered = render_pet_list(&[PetRecord::default()]).unwrap();
        assert_eq!(rendered.markup, "<p> - </p>");
    }

    #[test]
    fn test_fallback_notice_is_escaped() {
        let rendered = render_fallback("Pets <unavailable>").unwrap();

        assert_eq!(
            rendered.markup,
            r#"<p class="pets-error">Pets &#60;unavailable&#62;</p>"#
        );
        assert_eq!(rendered.record_count, 0);
    }
}
