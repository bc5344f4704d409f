//! Math typesetting backends.
//!
//! The HTML renderer hands every `math` and `inlineMath` value to a
//! [`MathRenderer`]. A failure is reported as `MdError::MalformedMath` and
//! recovered by the renderer; it never aborts a document.

use latex2mathml::{DisplayStyle, latex_to_mathml};

use crate::error::{MdError, MdResult};

/// Whether a formula is set inline or as a display block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathMode {
    Inline,
    Display,
}

/// Turns TeX source into HTML-embeddable markup.
pub trait MathRenderer: Send + Sync {
    /// Backend name; part of the pipeline fingerprint.
    fn name(&self) -> &'static str;

    /// Typeset one formula.
    fn render(&self, tex: &str, mode: MathMode) -> MdResult<String>;
}

/// LaTeX → MathML via `latex2mathml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathMl;

impl MathRenderer for MathMl {
    fn name(&self) -> &'static str {
        "mathml"
    }

    fn render(&self, tex: &str, mode: MathMode) -> MdResult<String> {
        let style = match mode {
            MathMode::Inline => DisplayStyle::Inline,
            MathMode::Display => DisplayStyle::Block,
        };
        latex_to_mathml(tex, style).map_err(|e| MdError::MalformedMath {
            tex: tex.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_mathml() {
        let out = MathMl.render("x^2", MathMode::Inline).unwrap();
        assert!(out.contains("<math"));
        assert!(out.contains("<msup>"));
    }

    #[test]
    fn test_display_mathml() {
        let out = MathMl.render(r"\frac{a}{b}", MathMode::Display).unwrap();
        assert!(out.contains("display=\"block\""));
    }

    #[test]
    fn test_malformed() {
        let tex = r"\begin{nosuchenv}x\end{nosuchenv}";
        let err = MathMl.render(tex, MathMode::Inline).unwrap_err();
        assert!(matches!(err, MdError::MalformedMath { tex: ref t, .. } if t == tex));
    }
}
