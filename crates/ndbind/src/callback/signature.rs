//! C signature parsing and per-family signature tables.
//!
//! ## Purpose
//!
//! A labeled low-level callable declares its C signature as a string. This
//! module parses such strings into a structural form and builds, for each
//! kernel family, the ordered list of signatures the family accepts.
//!
//! ## Design notes
//!
//! * **Structural comparison**: Signatures are compared after parsing, so
//!   whitespace and pointer spacing (`double*` vs `double *`) do not matter.
//! * **Width-selected aliases**: Besides `intptr_t` and `npy_intp`, the table
//!   admits each of `short`, `int`, `long`, `long long` whose width equals the
//!   platform pointer width. The choice compares `size_of` values at run time.
//!
//! ## Key concepts
//!
//! * **KernelFamily**: Generic 1-D filter, generic n-D filter, coordinate mapping.
//! * **AdapterShape**: The host-callback adapter each family uses.

// External dependencies
use std::ffi::{c_int, c_long, c_longlong, c_short};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::mem::size_of;

// ============================================================================
// Kernel Families
// ============================================================================

/// The calling conventions a pluggable kernel can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelFamily {
    /// `int (double *, intp, double *, intp, void *)`: one line in, one line out.
    Filter1D,

    /// `int (double *, intp, double *, void *)`: one window in, one value out.
    Filter,

    /// `int (intp *, double *, int, int, void *)`: output coordinate to input coordinate.
    Map,
}

/// Host-callback adapter used by a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterShape {
    /// Input and output lines of possibly different lengths.
    WindowResize,

    /// A window of fixed size reduced to one value.
    FixedWindow,

    /// A coordinate tuple mapped to another coordinate tuple.
    CoordinateMapping,
}

impl KernelFamily {
    /// Short name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Filter1D => "filter1d",
            Self::Filter => "filter",
            Self::Map => "map",
        }
    }

    /// Adapter a host callable of this family is bound to.
    pub fn adapter_shape(self) -> AdapterShape {
        match self {
            Self::Filter1D => AdapterShape::WindowResize,
            Self::Filter => AdapterShape::FixedWindow,
            Self::Map => AdapterShape::CoordinateMapping,
        }
    }

    fn render(self, intp: &str) -> String {
        match self {
            Self::Filter1D => format!("int (double *, {intp}, double *, {intp}, void *)"),
            Self::Filter => format!("int (double *, {intp}, double *, void *)"),
            Self::Map => format!("int ({intp} *, double *, int, int, void *)"),
        }
    }

    /// Ordered signatures accepted for this family on the running platform.
    pub fn signature_table(self) -> Vec<Signature> {
        pointer_width_integer_names()
            .into_iter()
            .filter_map(|name| Signature::parse(&self.render(name)))
            .collect()
    }

    /// Index of the first table entry structurally equal to `label`.
    pub fn match_signature(self, label: &str) -> Option<usize> {
        let parsed = Signature::parse(label)?;
        self.signature_table()
            .iter()
            .position(|candidate| *candidate == parsed)
    }
}

impl Display for KernelFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// Integer type names that denote a pointer-width integer, in table order.
pub fn pointer_width_integer_names() -> Vec<&'static str> {
    let width = size_of::<isize>();
    let mut names = vec!["intptr_t", "npy_intp"];
    for (name, size) in [
        ("short", size_of::<c_short>()),
        ("int", size_of::<c_int>()),
        ("long", size_of::<c_long>()),
        ("long long", size_of::<c_longlong>()),
    ] {
        if size == width {
            names.push(name);
        }
    }
    names
}

// ============================================================================
// Parsed Signatures
// ============================================================================

/// A parameter or return type: a base type name and a pointer depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CType {
    /// Base type with single spaces between words, e.g. `"long long"`.
    pub base: String,

    /// Number of `*` after the base type.
    pub pointers: usize,
}

impl CType {
    fn parse(text: &str) -> Option<Self> {
        let pointers = text.chars().filter(|&c| c == '*').count();
        let base = text
            .replace('*', " ")
            .split_whitespace()
            .filter(|word| *word != "const")
            .collect::<Vec<_>>()
            .join(" ");
        if base.is_empty() || !base.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ') {
            return None;
        }
        // A star may only follow the base type.
        let first_star = text.find('*').unwrap_or(text.len());
        if text[first_star..].chars().any(|c| c != '*' && !c.is_whitespace()) {
            return None;
        }
        Some(Self { base, pointers })
    }
}

/// A parsed C function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Return type.
    pub ret: CType,

    /// Parameter types, in order.
    pub params: Vec<CType>,
}

impl Signature {
    /// Parse `"ret (p1, p2, ...)"`. Returns `None` for malformed text.
    pub fn parse(text: &str) -> Option<Self> {
        let open = text.find('(')?;
        let close = text.rfind(')')?;
        if close < open || !text[close + 1..].trim().is_empty() {
            return None;
        }
        let ret = CType::parse(&text[..open])?;
        let inner = text[open + 1..close].trim();
        let params = if inner.is_empty() {
            Vec::new()
        } else {
            inner
                .split(',')
                .map(CType::parse)
                .collect::<Option<Vec<_>>>()?
        };
        Some(Self { ret, params })
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let render = |t: &CType| {
            if t.pointers == 0 {
                t.base.clone()
            } else {
                format!("{} {}", t.base, "*".repeat(t.pointers))
            }
        };
        let params: Vec<String> = self.params.iter().map(render).collect();
        write!(f, "{} ({})", render(&self.ret), params.join(", "))
    }
}
