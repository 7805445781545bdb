use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Schools recognised by the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchoolCode {
    Sces,
    Sbs,
    Sls,
    Shs,
    Tourism,
    Shm,
}

impl SchoolCode {
    pub const ALL: [SchoolCode; 6] = [
        SchoolCode::Sces,
        SchoolCode::Sbs,
        SchoolCode::Sls,
        SchoolCode::Shs,
        SchoolCode::Tourism,
        SchoolCode::Shm,
    ];

    /// Upper-case code as it appears in role names and URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolCode::Sces => "SCES",
            SchoolCode::Sbs => "SBS",
            SchoolCode::Sls => "SLS",
            SchoolCode::Shs => "SHS",
            SchoolCode::Tourism => "TOURISM",
            SchoolCode::Shm => "SHM",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SchoolCode::Sces => "School of Computing and Engineering Sciences",
            SchoolCode::Sbs => "School of Business Studies",
            SchoolCode::Sls => "School of Legal Studies",
            SchoolCode::Shs => "School of Health Sciences",
            SchoolCode::Tourism => "School of Tourism and Hospitality",
            SchoolCode::Shm => "School of Hospitality Management",
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for SchoolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchoolCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("{:?} is not a recognised school code.", s))
    }
}

/// Home school of a non-admin user.
///
/// Holds the code exactly as it was derived: a faculty admin role suffix is
/// kept verbatim even when it is not one of [`SchoolCode::ALL`], so callers
/// that need the closed enumeration go through [`HomeSchool::school_code`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HomeSchool(String);

impl HomeSchool {
    pub const FACULTY_ADMIN_PREFIX: &'static str = "Faculty Admin - ";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The recognised school this code names, if any
    pub fn school_code(&self) -> Option<SchoolCode> {
        SchoolCode::parse(&self.0)
    }

    /// Whether a school code taken from a URL or route parameter names this school
    ///
    /// The code is upper-cased and compared with the home school exactly, so a
    /// home school kept verbatim from a mixed-case role suffix never matches.
    pub fn matches(&self, code: &str) -> bool {
        code.trim().to_uppercase() == self.0
    }

    /// Path segment used when redirecting a user to their own school
    pub fn path_segment(&self) -> String {
        self.0.to_lowercase()
    }

    /// Derive the home school from role names and the free-text `schools` field.
    ///
    /// A `"Faculty Admin - {SCHOOL}"` role wins and its suffix is taken as-is.
    /// Otherwise a non-empty `schools` value is used, upper-cased.
    pub fn derive<S: AsRef<str>>(roles: &[S], schools: Option<&str>) -> Option<Self> {
        let from_role = roles.iter().find_map(|role| {
            role.as_ref()
                .strip_prefix(Self::FACULTY_ADMIN_PREFIX)
                .filter(|suffix| !suffix.is_empty())
                .map(|suffix| Self::new(suffix))
        });
        if from_role.is_some() {
            return from_role;
        }

        schools
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Self::new(value.to_uppercase()))
    }
}

impl fmt::Display for HomeSchool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SchoolCode> for HomeSchool {
    fn from(code: SchoolCode) -> Self {
        Self::new(code.as_str())
    }
}
