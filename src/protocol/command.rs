//! Command definitions
//!
//! A [`Command`] is the ordered list of raw arguments sent as one request.
//! It is built either from a printf-like template or with the builder
//! methods, and is discarded once encoded.

use bytes::Bytes;

use crate::error::{RespError, Result};

/// A typed argument for a command template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg<'a> {
    /// Consumed by `%s`: text, cut at its first NUL byte
    Str(&'a str),

    /// Consumed by `%b`: binary-safe bytes, appended in full
    Bin(&'a [u8]),
}

impl Arg<'_> {
    fn kind_name(&self) -> &'static str {
        match self {
            Arg::Str(_) => "text",
            Arg::Bin(_) => "binary",
        }
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Arg::Str(value)
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(value: &'a String) -> Self {
        Arg::Str(value)
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(value: &'a [u8]) -> Self {
        Arg::Bin(value)
    }
}

impl<'a> From<&'a Vec<u8>> for Arg<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Arg::Bin(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Arg<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Arg::Bin(value)
    }
}

/// A command waiting to be encoded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    args: Vec<Bytes>,
}

impl Command {
    /// Start a command with its name as the first argument
    pub fn new(name: impl AsRef<[u8]>) -> Self {
        Self {
            args: vec![Bytes::copy_from_slice(name.as_ref())],
        }
    }

    /// Append an argument (builder style)
    pub fn arg(mut self, arg: impl AsRef<[u8]>) -> Self {
        self.push_arg(arg);
        self
    }

    /// Append an argument in place
    pub fn push_arg(&mut self, arg: impl AsRef<[u8]>) {
        self.args.push(Bytes::copy_from_slice(arg.as_ref()));
    }

    /// Build a command from already split arguments
    pub fn from_args<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        Self {
            args: args
                .into_iter()
                .map(|arg| Bytes::copy_from_slice(arg.as_ref()))
                .collect(),
        }
    }

    /// Build a command from a template such as `"SET %s %b"`.
    ///
    /// Template grammar:
    /// - a space ends the current argument (runs of spaces are collapsed)
    /// - `%s` appends the next argument, which must be [`Arg::Str`]
    /// - `%b` appends the next argument, which must be [`Arg::Bin`]
    /// - `%%` appends a literal `%`
    /// - any other byte is appended to the current argument
    ///
    /// Empty arguments are dropped. Unknown placeholders, a trailing `%`,
    /// missing, mistyped or unused arguments are all [`RespError::Format`].
    pub fn format(template: &str, args: &[Arg<'_>]) -> Result<Self> {
        let bytes = template.as_bytes();
        let mut remaining = args.iter();
        let mut consumed = 0usize;
        let mut current: Vec<u8> = Vec::new();
        let mut parsed: Vec<Bytes> = Vec::new();

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b' ' => finish_arg(&mut parsed, &mut current)?,
                b'%' => {
                    let spec = template[i + 1..].chars().next().ok_or_else(|| {
                        RespError::Format(format!("template {:?} ends with a lone '%'", template))
                    })?;
                    match spec {
                        's' | 'b' => {
                            let arg = remaining.next().ok_or_else(|| {
                                RespError::Format(format!(
                                    "placeholder '%{}' at byte {} has no argument ({} given)",
                                    spec,
                                    i,
                                    args.len()
                                ))
                            })?;
                            consumed += 1;
                            match (spec, arg) {
                                ('s', Arg::Str(text)) => {
                                    let text = text.as_bytes();
                                    let end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
                                    append(&mut current, &text[..end])?;
                                }
                                ('b', Arg::Bin(data)) => append(&mut current, data)?,
                                _ => {
                                    return Err(RespError::Format(format!(
                                        "placeholder '%{}' got a {} argument (argument {})",
                                        spec,
                                        arg.kind_name(),
                                        consumed
                                    )))
                                }
                            }
                        }
                        '%' => append(&mut current, b"%")?,
                        other => {
                            return Err(RespError::Format(format!(
                                "unknown placeholder '%{}' at byte {}",
                                other, i
                            )))
                        }
                    }
                    // '%' plus an ASCII specifier; any other char already returned
                    i += 1;
                }
                byte => append(&mut current, &[byte])?,
            }
            i += 1;
        }
        finish_arg(&mut parsed, &mut current)?;

        if consumed < args.len() {
            return Err(RespError::Format(format!(
                "template {:?} uses {} of {} arguments",
                template,
                consumed,
                args.len()
            )));
        }

        Ok(Self { args: parsed })
    }

    /// Get the raw arguments in order
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// Get the command name (first argument)
    pub fn name(&self) -> Option<&[u8]> {
        self.args.first().map(|arg| arg.as_ref())
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Exact size of the encoded request in bytes
    pub fn encoded_len(&self) -> usize {
        let header = 1 + decimal_len(self.args.len()) + 2;
        self.args.iter().fold(header, |total, arg| {
            total + 1 + decimal_len(arg.len()) + 2 + arg.len() + 2
        })
    }
}

/// Number of ASCII digits needed to print `value`
pub(crate) fn decimal_len(mut value: usize) -> usize {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}

fn append(current: &mut Vec<u8>, data: &[u8]) -> Result<()> {
    current.try_reserve(data.len()).map_err(|e| {
        RespError::OutOfMemory(format!("growing command argument by {} bytes: {}", data.len(), e))
    })?;
    current.extend_from_slice(data);
    Ok(())
}

fn finish_arg(parsed: &mut Vec<Bytes>, current: &mut Vec<u8>) -> Result<()> {
    if current.is_empty() {
        return Ok(());
    }
    parsed
        .try_reserve(1)
        .map_err(|e| RespError::OutOfMemory(format!("growing command argument list: {}", e)))?;
    parsed.push(Bytes::from(std::mem::take(current)));
    Ok(())
}
