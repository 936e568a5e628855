//! Full / light mode gate

use crate::features::expression_builder::domain::CompileContext;
use crate::shared::models::FileKind;

pub struct ModeController;

impl ModeController {
    /// Full extraction only for project files with the switch on
    ///
    /// Dependency files always stay light to bound output size.
    pub fn should_compile(ctx: &CompileContext) -> bool {
        ctx.full_mode && ctx.file_kind == FileKind::Project
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_matrix() {
        let cases = [
            (true, FileKind::Project, true),
            (true, FileKind::Dependency, false),
            (false, FileKind::Project, false),
            (false, FileKind::Dependency, false),
        ];
        for (full_mode, kind, expected) in cases {
            let ctx = CompileContext::new("urn:t#", kind, full_mode);
            assert_eq!(ModeController::should_compile(&ctx), expected, "{full_mode} {kind}");
        }
    }
}
