//! Output buffers for one code generation pass.

use std::fmt::Write;

/// Imports and memory every module starts with.
pub const PREAMBLE: [&str; 4] = [
    "(import \"io\" \"print_i\" (func $io_print_i (param i64)))",
    "(import \"io\" \"print_s\" (func $io_print_s (param i32 i32)))",
    "(import \"io\" \"print_b\" (func $io_print_b (param i32)))",
    "(memory (export \"memory\") 1)",
];

const INDENT: &str = "  ";

/// Instruction text plus the bytes of the data segment.
///
/// Pooled data is only ever appended: every call to `add_to_memory` gets a
/// fresh offset, even for contents that were stored before.
#[derive(Debug)]
pub struct WasmContext {
    body: String,
    memory: Vec<u8>,
    indent: usize,
}

impl Default for WasmContext {
    fn default() -> Self {
        Self::new()
    }
}

impl WasmContext {
    pub fn new() -> Self {
        WasmContext {
            body: String::new(),
            memory: Vec::new(),
            // Everything in the body sits inside `(module`
            indent: 1,
        }
    }

    pub fn push_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.body.push_str(INDENT);
        }
        self.body.push_str(line);
        self.body.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Appends the UTF-8 bytes of `text`, returning `(offset, length)`.
    pub fn add_to_memory(&mut self, text: &str) -> (u32, u32) {
        self.add_bytes(text.as_bytes())
    }

    /// Appends `value` as 4 little-endian bytes, returning `(offset, 4)`.
    pub fn add_u32_to_memory(&mut self, value: u32) -> (u32, u32) {
        self.add_bytes(&value.to_le_bytes())
    }

    fn add_bytes(&mut self, bytes: &[u8]) -> (u32, u32) {
        let offset = self.memory.len() as u32;
        self.memory.extend_from_slice(bytes);
        (offset, bytes.len() as u32)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Wraps the body into a complete module.
    pub fn render(&self) -> String {
        let mut module = String::from("(module\n");
        for line in PREAMBLE {
            module.push_str(INDENT);
            module.push_str(line);
            module.push('\n');
        }

        module.push_str(&self.body);

        if !self.memory.is_empty() {
            let _ = writeln!(
                module,
                "{}(data (i32.const 0) \"{}\")",
                INDENT,
                escape_bytes(&self.memory)
            );
        }

        module.push_str(")\n");
        module
    }
}

/// Escapes data segment bytes for a WAT string literal.
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut escaped = String::with_capacity(bytes.len());
    for &byte in bytes {
        match byte {
            0x20..=0x7e if byte != b'"' && byte != b'\\' => escaped.push(byte as char),
            _ => escaped.push_str(&format!("\\{:02x}", byte)),
        }
    }
    escaped
}
