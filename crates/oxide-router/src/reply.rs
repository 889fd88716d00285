//! Normalizing action return values into responses.

use crate::response::Response;

/// The value returned by a controller action.
///
/// Actions may return anything convertible into a `Reply`: a finished
/// [`Response`], text, `()` or an `Option` of those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A response built by the action, passed through unchanged.
    Response(Response),
    /// Text to send as a 200 response.
    Text(String),
    /// No usable value. Adapted to the canonical 404 response.
    Empty,
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

impl<T: Into<Self>> From<Option<T>> for Reply {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// Content types a text reply can be sent as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// `text/html`
    Html,
    /// `application/json`
    Json,
}

impl ContentType {
    /// Picks a content type from an `Accept` header.
    ///
    /// `application/json` wins only when it is preferred over `text/html`
    /// (higher quality, or listed first at equal quality). Anything else,
    /// including a missing header, yields `text/html`.
    pub fn negotiate(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return Self::Html;
        };

        let mut html: Option<(f32, usize)> = None;
        let mut json: Option<(f32, usize)> = None;

        for (position, entry) in accept.split(',').enumerate() {
            let mut parts = entry.split(';').map(str::trim);
            let media = parts.next().unwrap_or_default().to_ascii_lowercase();
            let quality = parts
                .find_map(|p| p.strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);

            let slot = match media.as_str() {
                "text/html" => &mut html,
                "application/json" => &mut json,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some((quality, position));
            }
        }

        match (json, html) {
            (Some((jq, _)), None) if jq > 0.0 => Self::Json,
            (Some((jq, jp)), Some((hq, hp)))
                if jq > hq || ((jq - hq).abs() < f32::EPSILON && jp < hp) =>
            {
                Self::Json
            }
            _ => Self::Html,
        }
    }

    /// Returns the MIME type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Json => "application/json",
        }
    }
}

/// Converts an action's reply into a response.
///
/// `accept` is the request's `Accept` header, used to label text replies.
///
/// ```
/// use oxide_router::{adapt, Reply};
///
/// let res = adapt(Reply::from("hello"), None);
/// assert_eq!(res.status, 200);
/// assert_eq!(res.get_header("Content-Type"), Some("text/html"));
///
/// let res = adapt(Reply::Empty, None);
/// assert_eq!(res.status, 404);
/// ```
pub fn adapt(reply: Reply, accept: Option<&str>) -> Response {
    match reply {
        Reply::Response(response) => response,
        Reply::Text(text) => Response::ok()
            .header("Content-Type", ContentType::negotiate(accept).as_str())
            .body(text),
        Reply::Empty => Response::not_found(),
    }
}
