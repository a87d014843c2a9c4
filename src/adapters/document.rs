use crate::core::{Document, Storage};
use crate::utils::error::{RenderError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::Mutex;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements keyed by id, for hosts that keep the page in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocument {
    elements: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elements<I, K, V>(elements: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let elements = elements
            .into_iter()
            .map(|(id, content)| (id.into(), content.into()))
            .collect();
        Self {
            elements: Arc::new(Mutex::new(elements)),
        }
    }

    pub async fn insert_element(&self, element_id: &str, content: &str) {
        let mut elements = self.elements.lock().await;
        elements.insert(element_id.to_string(), content.to_string());
    }

    pub async fn content(&self, element_id: &str) -> Option<String> {
        let elements = self.elements.lock().await;
        elements.get(element_id).cloned()
    }
}

impl Document for InMemoryDocument {
    async fn replace_content(&self, element_id: &str, markup: &str) -> Result<()> {
        let mut elements = self.elements.lock().await;
        match elements.get_mut(element_id) {
            Some(content) => {
                *content = markup.to_string();
                Ok(())
            }
            None => Err(RenderError::TargetMissing {
                element_id: element_id.to_string(),
            }),
        }
    }
}

/// An HTML file read and written through a [`Storage`] backend.
#[derive(Debug, Clone)]
pub struct HtmlFileDocument<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> HtmlFileDocument<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<S: Storage> Document for HtmlFileDocument<S> {
    async fn replace_content(&self, element_id: &str, markup: &str) -> Result<()> {
        let bytes = self.storage.read_file(&self.path).await?;
        let html = String::from_utf8(bytes).map_err(|e| {
            RenderError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        let range =
            locate_element_content(&html, element_id)?.ok_or_else(|| RenderError::TargetMissing {
                element_id: element_id.to_string(),
            })?;

        let mut updated = String::with_capacity(html.len() - range.len() + markup.len());
        updated.push_str(&html[..range.start]);
        updated.push_str(markup);
        updated.push_str(&html[range.end..]);

        tracing::debug!(
            "Writing {} ({} bytes, #{} content {} -> {} bytes)",
            self.path,
            updated.len(),
            element_id,
            range.len(),
            markup.len()
        );
        self.storage.write_file(&self.path, updated.as_bytes()).await
    }
}

// 註解、標籤（引號內的屬性值視為不透明）
const TOKEN_PATTERN: &str = r#"(?s)<!--(?:.*?-->|.*)|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?)*)\s*(/?)\s*>"#;
const ATTRIBUTE_PATTERN: &str = r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#;

/// Elements whose content is text, never markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

struct Container {
    tag: String,
    content_start: usize,
    depth: usize,
}

/// Byte range of the content between the element's opening tag and its matching
/// close tag. `None` if no container element carries that id.
///
/// Comments and the bodies of raw-text elements are skipped. Void, self-closing and
/// unclosed elements are not containers.
pub fn locate_element_content(html: &str, element_id: &str) -> Result<Option<Range<usize>>> {
    let token = Regex::new(TOKEN_PATTERN).map_err(regex_error)?;
    let attribute = Regex::new(ATTRIBUTE_PATTERN).map_err(regex_error)?;

    let mut target: Option<Container> = None;
    let mut pos = 0;

    while let Some(caps) = token.captures_at(html, pos) {
        let Some(whole) = caps.get(0) else { break };
        pos = whole.end();

        let Some(name) = caps.get(2) else {
            continue; // 註解
        };
        let tag = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty());

        match target.as_mut() {
            None => {
                let attrs = caps.get(3).map_or("", |m| m.as_str());
                if !closing && has_id(&attribute, attrs, element_id) {
                    if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
                        return Ok(None);
                    }
                    if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                        return Ok(find_raw_text_end(html, pos, &tag).map(|end| pos..end));
                    }
                    target = Some(Container {
                        tag: tag.clone(),
                        content_start: pos,
                        depth: 1,
                    });
                }
            }
            // 追蹤同名標籤的巢狀深度，找到對應的結束標籤
            Some(container) if container.tag == tag => {
                if closing {
                    container.depth -= 1;
                    if container.depth == 0 {
                        return Ok(Some(container.content_start..whole.start()));
                    }
                } else if !self_closing {
                    container.depth += 1;
                }
            }
            Some(_) => {}
        }

        if !closing && RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            match find_raw_text_end(html, pos, &tag) {
                Some(end) => pos = end,
                None => return Ok(None),
            }
        }
    }

    Ok(None)
}

fn has_id(attribute: &Regex, attrs: &str, element_id: &str) -> bool {
    attribute.captures_iter(attrs).any(|caps| {
        let is_id = caps
            .get(1)
            .is_some_and(|name| name.as_str().eq_ignore_ascii_case("id"));
        let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4));
        is_id && value.is_some_and(|v| v.as_str() == element_id)
    })
}

/// Offset of the `</tag` that ends a raw-text element opened before `from`.
fn find_raw_text_end(html: &str, from: usize, tag: &str) -> Option<usize> {
    let needle = format!("</{}", tag);
    html[from..]
        .to_ascii_lowercase()
        .find(&needle)
        .map(|offset| from + offset)
}

fn regex_error(e: regex::Error) -> RenderError {
    RenderError::ConfigError {
        message: format!("Cannot build element matcher: {}", e),
    }
}
