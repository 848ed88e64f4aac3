use std::collections::HashMap;

use eyre::eyre;
use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, instrument};
use vm::op::{Opcode, Operand as Width};

use crate::{
    assemble::Assembler,
    parse::{self, render, render_errors, Arg, Call, Span, Stmt},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Unknown instruction `{0}`")]
    UnknownMnemonic(String, Span),
    #[error("`{name}` takes {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },
    #[error("Label `{0}` is never defined")]
    UndefinedLabel(String, Span),
    #[error("Label `{0}` is defined more than once")]
    DuplicateLabel(String, Span),
    #[error("Label `{0}` used as an 8 bit value, only 16 bit operands take labels")]
    LabelNotAllowed(String, Span),
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::UnknownMnemonic(_, span)
            | CompileError::UndefinedLabel(_, span)
            | CompileError::DuplicateLabel(_, span)
            | CompileError::LabelNotAllowed(_, span) => *span,
            CompileError::Arity { span, .. } => *span,
        }
    }
}

/// Raw byte emission. Not an opcode, so it is resolved by name.
const DB: &str = "db";

/// Byte offset of every label, relative to the start of the script
type Labels = HashMap<String, usize>;

/// Assemble a parsed script.
///
/// A final `halt()` is always appended so a script that runs off its end stops instead of
/// playing whatever follows it in the buffer.
#[instrument(skip(ast))]
pub fn compile(ast: &[Stmt]) -> Result<Vec<u8>, Vec<CompileError>> {
    let (labels, mut errs) = collect_labels(ast);

    let mut asm = Assembler::new();
    for call in ast.iter().filter_map(|stmt| stmt.call_ref()) {
        if let Err(e) = emit(&mut asm, call, &labels) {
            errs.push(e);
        }
    }
    asm.halt();

    if !errs.is_empty() {
        return Err(errs);
    }
    debug!(bytes = asm.len(), labels = labels.len(), "compiled script");
    Ok(asm.into_bytes())
}

/// Parse and compile, rendering any problem as a source report
pub fn compile_source(src: &str) -> Result<Vec<u8>, eyre::Report> {
    let ast = parse::parse(src).map_err(|errs| eyre!("{}", render_errors(src, &errs)))?;
    compile(&ast).map_err(|errs| {
        let reports = errs
            .iter()
            .map(|e| render(src, e.span(), e.to_string(), reason(e).to_string()))
            .join("");
        eyre!("{reports}")
    })
}

fn reason(e: &CompileError) -> &'static str {
    match e {
        CompileError::UnknownMnemonic(..) => "not an instruction",
        CompileError::Arity { .. } => "wrong number of arguments",
        CompileError::UndefinedLabel(..) => "no label with this name",
        CompileError::DuplicateLabel(..) => "defined again here",
        CompileError::LabelNotAllowed(..) => "expected a number",
    }
}

/// Encoded size of a call, known before any label is resolved
fn size_of(call: &Call) -> Result<usize, CompileError> {
    if call.name == DB {
        return Ok(call.args.len());
    }
    Opcode::from_mnemonic(&call.name)
        .map(Opcode::size)
        .ok_or_else(|| CompileError::UnknownMnemonic(call.name.clone(), call.span))
}

fn collect_labels(ast: &[Stmt]) -> (Labels, Vec<CompileError>) {
    let mut labels = Labels::new();
    let mut errs = vec![];
    let mut offset = 0;
    for stmt in ast {
        match stmt {
            Stmt::Label(name, span) => {
                if labels.insert(name.clone(), offset).is_some() {
                    errs.push(CompileError::DuplicateLabel(name.clone(), *span));
                }
            }
            // unknown mnemonics are reported once, by `emit`
            Stmt::Call(call) => offset += size_of(call).unwrap_or(0),
        }
    }
    (labels, errs)
}

fn resolve(arg: &(Arg, Span), width: Width, labels: &Labels) -> Result<i64, CompileError> {
    match (&arg.0, width) {
        (Arg::Number(n), _) => Ok(*n),
        (Arg::Label(name), Width::U16) => labels
            .get(name)
            .map(|offset| *offset as i64)
            .ok_or_else(|| CompileError::UndefinedLabel(name.clone(), arg.1)),
        (Arg::Label(name), _) => Err(CompileError::LabelNotAllowed(name.clone(), arg.1)),
    }
}

fn emit(asm: &mut Assembler, call: &Call, labels: &Labels) -> Result<(), CompileError> {
    if call.name == DB {
        let bytes = call
            .args
            .iter()
            .map(|arg| resolve(arg, Width::U8, labels))
            .collect::<Result<Vec<_>, _>>()?;
        asm.db(&bytes);
        return Ok(());
    }

    let opcode = Opcode::from_mnemonic(&call.name)
        .ok_or_else(|| CompileError::UnknownMnemonic(call.name.clone(), call.span))?;
    let width = opcode.operand();
    let expected = usize::from(!width.is_empty());
    if call.args.len() != expected {
        return Err(CompileError::Arity {
            name: call.name.clone(),
            expected,
            got: call.args.len(),
            span: call.span,
        });
    }

    let arg = match call.args.first() {
        Some(arg) => resolve(arg, width, labels)?,
        None => 0,
    };
    asm.emit(opcode, arg);
    Ok(())
}
