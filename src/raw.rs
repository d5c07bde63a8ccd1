/// The blocks of a Tango netlist, before any validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TangoFile<'a> {
    pub components: Vec<ComponentBlock<'a>>,
    pub nets: Vec<NetBlock<'a>>,
    /// Blocks that ended without their closing delimiter
    pub unterminated: Vec<usize>,
}

/// A single line of input with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// The lines between `[` and `]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentBlock<'a> {
    pub line: usize,
    pub lines: Vec<Line<'a>>,
}

/// The lines between `(` and `)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetBlock<'a> {
    pub line: usize,
    pub lines: Vec<Line<'a>>,
}
