//! Serializer options

/// Line terminator written after every serialized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Layout options for AST → text serialization
#[derive(Debug, Clone)]
pub struct SerializerOptions {
    /// Number of spaces per block level
    pub indent_size: usize,
    /// Offset of a list marker (`- `) relative to its key
    pub list_indent: usize,
    pub line_ending: LineEnding,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            indent_size: 4,
            list_indent: 2,
            line_ending: LineEnding::Lf,
        }
    }
}

impl SerializerOptions {
    /// Column of the properties nested in a block whose key sits at `column`
    pub fn block_column(&self, column: usize) -> usize {
        column + self.indent_size
    }

    /// Column of the `- ` marker of a list whose key sits at `column`
    pub fn marker_column(&self, column: usize) -> usize {
        column + self.list_indent
    }

    /// Column of the properties of a list item whose key sits at `column`
    pub fn item_column(&self, column: usize) -> usize {
        self.marker_column(column) + 2
    }
}
