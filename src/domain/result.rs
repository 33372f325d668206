//! Result type alias for Figport
//!
//! This module provides a convenient Result type alias that uses FigportError
//! as the error type.

use super::errors::FigportError;

/// Result type alias for Figport operations
///
/// # Examples
///
/// ```
/// use figport::domain::result::Result;
/// use figport::domain::errors::FigportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(FigportError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FigportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::FigportError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(FigportError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
