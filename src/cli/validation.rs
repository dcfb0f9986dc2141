use crate::cli::args::CliArgs;

/// Checks that only depend on the command line. Values that may also come
/// from the config file (format, sequencing) are checked once merged.
pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(output) = args.output.as_deref() {
        if output.trim().is_empty() {
            return Err("invalid --output, expected a file path".to_string());
        }
    }
    if args.interactive && args.init_config {
        return Err("--init-config cannot be combined with --interactive".to_string());
    }
    Ok(())
}
