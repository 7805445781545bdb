use poem_openapi::Object;

use crate::types::internal::SchoolCode;

/// Entry of the closed school table
#[derive(Object, Debug)]
pub struct SchoolResponse {
    /// Upper-case school code
    pub code: String,

    /// Display name
    pub name: String,
}

impl From<SchoolCode> for SchoolResponse {
    fn from(code: SchoolCode) -> Self {
        Self {
            code: code.as_str().to_string(),
            name: code.display_name().to_string(),
        }
    }
}
