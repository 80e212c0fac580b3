use crate::config::ConverterConfig;
use crate::services::executor::CommandExecutor;
use async_trait::async_trait;
use service_core::error::AppError;
use std::ffi::OsString;
use std::path::Path;

/// PDF to DOCX conversion capability. Implementations block the calling
/// request until `docx_path` has been written or the conversion failed.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Short identifier used in logs and metrics.
    fn name(&self) -> &str;

    async fn convert(&self, pdf_path: &Path, docx_path: &Path) -> Result<(), AppError>;
}

/// Delegates to an external program, e.g. `pdf2docx convert {input} {output}`
/// or `soffice --headless --convert-to docx --outdir {output_dir} {input}`.
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
    executor: CommandExecutor,
}

impl CommandConverter {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            executor: CommandExecutor::new(config.timeout),
        }
    }

    /// Expands `{input}`, `{output}` and `{output_dir}` in each argument.
    pub fn render_args(&self, pdf_path: &Path, docx_path: &Path) -> Vec<OsString> {
        let input = pdf_path.to_string_lossy();
        let output = docx_path.to_string_lossy();
        let output_dir = docx_path
            .parent()
            .map(|p| p.to_string_lossy())
            .unwrap_or_default();

        self.args
            .iter()
            .map(|arg| match arg.as_str() {
                "{input}" => pdf_path.as_os_str().to_owned(),
                "{output}" => docx_path.as_os_str().to_owned(),
                other => OsString::from(
                    other
                        .replace("{input}", &input)
                        .replace("{output_dir}", &output_dir)
                        .replace("{output}", &output),
                ),
            })
            .collect()
    }
}

#[async_trait]
impl Converter for CommandConverter {
    fn name(&self) -> &str {
        &self.program
    }

    async fn convert(&self, pdf_path: &Path, docx_path: &Path) -> Result<(), AppError> {
        tracing::info!(
            converter = %self.program,
            pdf_path = %pdf_path.display(),
            docx_path = %docx_path.display(),
            "Converting PDF document"
        );

        // A leftover output from an earlier upload must not pass the check below.
        match tokio::fs::remove_file(docx_path).await {
            Ok(()) => tracing::debug!(docx_path = %docx_path.display(), "Removed previous output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::StorageError(anyhow::Error::new(e).context(format!(
                    "Failed to remove previous output {}",
                    docx_path.display()
                ))))
            }
        }

        let args = self.render_args(pdf_path, docx_path);
        self.executor.execute(&self.program, &args).await?;

        let produced = tokio::fs::try_exists(docx_path).await.unwrap_or(false);
        if !produced {
            return Err(AppError::ConversionFailed(anyhow::anyhow!(
                "{} finished but no DOCX was written to {}",
                self.program,
                docx_path.display()
            )));
        }

        Ok(())
    }
}
