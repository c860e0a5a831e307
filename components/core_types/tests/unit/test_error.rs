//! Unit tests for LoaderError and LoadFailure

use core_types::{LoadFailure, LoaderError};

#[cfg(test)]
mod load_failure_tests {
    use super::*;

    #[test]
    fn test_failure_without_info() {
        let failure = LoadFailure::default();
        assert!(failure.message.is_none());
        assert_eq!(failure.to_string(), "<no info>");
    }

    #[test]
    fn test_failure_with_line() {
        let failure = LoadFailure::new("x is not defined").at("a.js", 7);
        assert_eq!(failure.to_string(), "Error in line 7: \"x is not defined\"");
    }
}

#[cfg(test)]
mod loader_error_tests {
    use super::*;

    #[test]
    fn test_resource_load_message() {
        let error = LoaderError::ResourceLoad {
            url: "http://localhost/a.js".to_string(),
            failure: LoadFailure::new("404"),
        };
        let message = error.to_string();
        assert!(message.contains("http://localhost/a.js"));
        assert!(message.contains("404"));
    }

    #[test]
    fn test_unknown_module_message() {
        let error = LoaderError::UnknownModule("app/main".to_string());
        assert_eq!(
            error.to_string(),
            "module \"app/main\" is not registered with the loader"
        );
    }

    #[test]
    fn test_errors_are_cloneable() {
        let error = LoaderError::Config("root_url is empty".to_string());
        let copy = error.clone();
        assert_eq!(error.to_string(), copy.to_string());
    }
}
