//! Experiment arms.

/// The experiment arm a synthetic user is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Control,
    Test,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Test => "test",
        }
    }

    /// Map a remote flag evaluation result onto an arm.
    ///
    /// Anything other than an exact `"test"` lands in control, including a
    /// missing or disabled flag.
    pub fn from_flag_response(response: Option<&str>) -> Self {
        match response {
            Some("test") => Self::Test,
            _ => Self::Control,
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flag_response() {
        assert_eq!(Variant::from_flag_response(Some("test")), Variant::Test);
        assert_eq!(Variant::from_flag_response(Some("control")), Variant::Control);
        assert_eq!(Variant::from_flag_response(Some("holdout")), Variant::Control);
        assert_eq!(Variant::from_flag_response(None), Variant::Control);
    }

    #[test]
    fn test_display() {
        assert_eq!(Variant::Control.to_string(), "control");
        assert_eq!(Variant::Test.to_string(), "test");
    }
}
