use serde::{Deserialize, Serialize};

/// Where a recipe's photo comes from.
///
/// On the wire the reference is two optional fields, `imageKey` and
/// `imageUri`. When both are present the URI wins; empty strings count as
/// absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "ImageFields", into = "ImageFields")]
pub enum ImageRef {
    #[default]
    None,
    /// Key into the images shipped with the application.
    Bundled(String),
    /// External URI, e.g. a file picked from the device gallery.
    Uri(String),
}

impl ImageRef {
    /// Resolve the stored pair of fields into a single reference.
    pub fn from_parts(key: Option<String>, uri: Option<String>) -> Self {
        match (non_empty(key), non_empty(uri)) {
            (_, Some(uri)) => Self::Uri(uri),
            (Some(key), None) => Self::Bundled(key),
            (None, None) => Self::None,
        }
    }

    /// External URI; an empty string gives [`ImageRef::None`].
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into()).normalized()
    }

    /// Bundled image key; an empty string gives [`ImageRef::None`].
    pub fn bundled(key: impl Into<String>) -> Self {
        Self::Bundled(key.into()).normalized()
    }

    /// Collapse an empty key or URI to [`ImageRef::None`], which is how it
    /// reads back from storage.
    pub fn normalized(self) -> Self {
        match self {
            Self::Bundled(key) if key.is_empty() => Self::None,
            Self::Uri(uri) if uri.is_empty() => Self::None,
            other => other,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn bundled_key(&self) -> Option<&str> {
        match self {
            Self::Bundled(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Self::Uri(uri) => Some(uri),
            _ => None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Wire shape of an [`ImageRef`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_uri: Option<String>,
}

impl From<ImageFields> for ImageRef {
    fn from(fields: ImageFields) -> Self {
        Self::from_parts(fields.image_key, fields.image_uri)
    }
}

impl From<ImageRef> for ImageFields {
    fn from(image: ImageRef) -> Self {
        match image.normalized() {
            ImageRef::None => Self::default(),
            ImageRef::Bundled(key) => Self {
                image_key: Some(key),
                image_uri: None,
            },
            ImageRef::Uri(uri) => Self {
                image_key: None,
                image_uri: Some(uri),
            },
        }
    }
}
