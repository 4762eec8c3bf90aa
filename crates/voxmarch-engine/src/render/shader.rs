use std::fmt;

/// A WGSL module failed to compile.
///
/// `diagnostics` holds one `line:column: message` entry per compiler error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderError {
    pub source_id: String,
    pub diagnostics: Vec<String>,
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader `{}` failed to compile", self.source_id)?;
        for d in &self.diagnostics {
            write!(f, "\n  {d}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ShaderError {}

impl ShaderError {
    /// Collects the error-level messages of a compilation report.
    ///
    /// Returns `None` when the report holds no errors (warnings are ignored).
    pub fn from_compilation_info(source_id: &str, info: &wgpu::CompilationInfo) -> Option<Self> {
        let diagnostics: Vec<String> = info
            .messages
            .iter()
            .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
            .map(|m| match &m.location {
                Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
                None => m.message.clone(),
            })
            .collect();

        if diagnostics.is_empty() {
            None
        } else {
            Some(Self {
                source_id: source_id.to_owned(),
                diagnostics,
            })
        }
    }
}

/// Compiles a WGSL module and fails with the compiler diagnostics on error.
pub fn compile_wgsl(
    device: &wgpu::Device,
    source_id: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(source_id),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let info = pollster::block_on(module.get_compilation_info());
    match ShaderError::from_compilation_info(source_id, &info) {
        Some(err) => Err(err),
        None => {
            log::debug!("compiled shader {source_id}");
            Ok(module)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_diagnostic() {
        let err = ShaderError {
            source_id: "trace.wgsl".into(),
            diagnostics: vec!["3:7: unknown type `vec5`".into(), "9:1: expected `}`".into()],
        };
        let text = err.to_string();
        assert!(text.starts_with("shader `trace.wgsl` failed to compile"));
        assert!(text.contains("3:7: unknown type `vec5`"));
        assert!(text.contains("9:1: expected `}`"));
    }

    #[test]
    fn empty_report_is_not_an_error() {
        let info = wgpu::CompilationInfo { messages: Vec::new() };
        assert!(ShaderError::from_compilation_info("x.wgsl", &info).is_none());
    }
}
