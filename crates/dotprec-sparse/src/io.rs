//! Textual form of sparse vectors.
//!
//! Two layouts are supported:
//!
//! - dense: `[v0, v1, ...]`, every element including zeros
//! - sparse: `[lb=L ]dim=N nnz=K {i: v, ...}` with logical indices; `lb=`
//!   is omitted for vectors indexed from 0
//!
//! `Display` picks the layout from the process-wide [`SparseFormat`];
//! parsing accepts either.

use crate::vector::SparseVector;
use crate::view::SparseView;
use dotprec_core::{sparse_format, DotError, Element, Result, SparseFormat};
use std::fmt;
use std::str::FromStr;

impl<T: Element> SparseVector<T> {
    /// Write the dense layout.
    pub fn fmt_dense(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.to_dense().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            v.write_text(f)?;
        }
        write!(f, "]")
    }

    /// Write the sparse layout.
    pub fn fmt_sparse(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lb() != 0 {
            write!(f, "lb={} ", self.lb())?;
        }
        write!(f, "dim={} nnz={} {{", self.dim(), self.nnz())?;
        for (k, (i, v)) in self.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{i}: ")?;
            v.write_text(f)?;
        }
        write!(f, "}}")
    }
}

impl<T: Element> fmt::Display for SparseVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match sparse_format() {
            SparseFormat::Dense => self.fmt_dense(f),
            SparseFormat::Sparse => self.fmt_sparse(f),
        }
    }
}

/// Split at commas outside brackets and parentheses.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_field<N: FromStr>(token: &str, key: &str) -> Result<N> {
    token
        .strip_prefix(key)
        .and_then(|v| v.strip_prefix('='))
        .ok_or_else(|| DotError::Parse(format!("expected `{key}=`, found `{token}`")))?
        .parse()
        .map_err(|_| DotError::Parse(format!("invalid value for `{key}` in `{token}`")))
}

fn parse_dense<T: Element>(body: &str) -> Result<SparseVector<T>> {
    if body.trim().is_empty() {
        return Ok(SparseVector::new(0));
    }
    let values = split_top_level(body)
        .into_iter()
        .map(T::parse)
        .collect::<Result<Vec<_>>>()?;
    Ok(SparseVector::from_dense(&values))
}

fn parse_sparse<T: Element>(s: &str) -> Result<SparseVector<T>> {
    let open = s
        .find('{')
        .ok_or_else(|| DotError::Parse(format!("missing `{{` in `{s}`")))?;
    let body = s[open + 1..]
        .trim_end()
        .strip_suffix('}')
        .ok_or_else(|| DotError::Parse(format!("missing `}}` in `{s}`")))?;

    let header: Vec<&str> = s[..open].split_whitespace().collect();
    let (lb, rest) = match header.first() {
        Some(token) if token.starts_with("lb=") => (parse_field(token, "lb")?, &header[1..]),
        _ => (0isize, &header[..]),
    };
    let [dim, nnz] = rest else {
        return Err(DotError::Parse(format!("expected `dim=N nnz=K`, found `{}`", rest.join(" "))));
    };
    let dim: usize = parse_field(dim, "dim")?;
    let nnz: usize = parse_field(nnz, "nnz")?;

    let mut entries = Vec::with_capacity(nnz);
    if !body.trim().is_empty() {
        for item in split_top_level(body) {
            let (index, value) = item
                .split_once(':')
                .ok_or_else(|| DotError::Parse(format!("expected `index: value`, found `{item}`")))?;
            let index: isize = index
                .trim()
                .parse()
                .map_err(|_| DotError::Parse(format!("invalid index `{}`", index.trim())))?;
            if index < lb || index >= lb + dim as isize {
                return Err(DotError::IndexOutOfRange {
                    index,
                    lb,
                    ub: lb + dim as isize - 1,
                });
            }
            entries.push(((index - lb) as usize, T::parse(value)?));
        }
    }
    if entries.len() != nnz {
        return Err(DotError::Parse(format!(
            "header declares {nnz} entries, found {}",
            entries.len()
        )));
    }
    entries.sort_by_key(|&(i, _)| i);
    if let Some(pair) = entries.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(DotError::DuplicateIndex(format!(
            "index {} given twice",
            lb + pair[0].0 as isize
        )));
    }
    Ok(SparseVector::from_entries(lb, dim, entries.into_iter()))
}

impl<T: Element> FromStr for SparseVector<T> {
    type Err = DotError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.strip_prefix('[') {
            Some(rest) => {
                let body = rest
                    .strip_suffix(']')
                    .ok_or_else(|| DotError::Parse(format!("missing `]` in `{s}`")))?;
                parse_dense(body)
            }
            None => parse_sparse(s),
        }
    }
}
