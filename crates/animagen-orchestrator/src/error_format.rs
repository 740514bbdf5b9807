//! Failure rendering for backend consumption
//!
//! Produces the structured error text sent back to the code generation
//! backend on fix attempts. Opaque to the orchestrator itself — it exists
//! solely as backend input. Two shapes: subprocess failures carry the full
//! captured streams plus common root-cause hints, everything else carries
//! the category, message, and cause chain.

use animagen_core::AnimagenError;

/// Render the last captured failure as backend-consumable text
pub fn format_failure_for_backend(error: &AnimagenError) -> String {
    match error {
        AnimagenError::RenderFailed {
            exit_code,
            command,
            stderr,
            stdout,
        } => {
            let code = exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown (terminated by signal or timeout)".to_string());
            let stderr = if stderr.is_empty() {
                "No stderr available"
            } else {
                stderr
            };
            let stdout = if stdout.is_empty() {
                "No stdout available"
            } else {
                stdout
            };
            format!(
                "MANIM SUBPROCESS ERROR:\n\
                 Return Code: {}\n\
                 Command: {}\n\
                 \n\
                 STDERR OUTPUT:\n{}\n\
                 \n\
                 STDOUT OUTPUT:\n{}\n\
                 \n\
                 This error occurred when trying to execute the manim command to render the animation.\n\
                 Common issues include:\n\
                 - Syntax errors in Python code\n\
                 - Missing imports\n\
                 - Incorrect Manim object usage\n\
                 - Scene class or construct method issues\n\
                 - Object positioning or animation errors\n",
                code, command, stderr, stdout
            )
        }
        other => {
            let mut trace = String::new();
            let mut source = std::error::Error::source(other);
            while let Some(cause) = source {
                trace.push_str(&format!("  caused by: {}\n", cause));
                source = cause.source();
            }
            if trace.is_empty() {
                trace.push_str("  (no further cause)\n");
            }
            format!(
                "EXECUTION ERROR:\n\
                 Error Type: {}\n\
                 Error Message: {}\n\
                 \n\
                 Cause trace:\n{}\
                 \n\
                 This error occurred during code execution or preparation.\n",
                other.category(),
                other,
                trace
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subprocess_shape() {
        let error = AnimagenError::RenderFailed {
            exit_code: Some(1),
            command: "manim -pql job.py GeneratedScene".to_string(),
            stderr: "NameError: name 'Circel' is not defined".to_string(),
            stdout: String::new(),
        };
        let text = format_failure_for_backend(&error);
        assert!(text.contains("Return Code: 1"));
        assert!(text.contains("manim -pql job.py GeneratedScene"));
        assert!(text.contains("Circel"));
        assert!(text.contains("No stdout available"));
        assert!(text.contains("Missing imports"));
    }

    #[test]
    fn test_generic_shape() {
        let error = AnimagenError::Upload("bucket rejected the write".to_string());
        let text = format_failure_for_backend(&error);
        assert!(text.contains("Error Type: upload"));
        assert!(text.contains("bucket rejected the write"));
        assert!(text.contains("Cause trace:"));
    }

    #[test]
    fn test_io_error_cause_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = AnimagenError::Io(inner);
        let text = format_failure_for_backend(&error);
        assert!(text.contains("Error Type: io"));
        assert!(text.contains("no such file"));
    }
}
