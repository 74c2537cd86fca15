/// An entry in the error code registry.
pub struct ErrorEntry {
    pub code: &'static str,
    pub short: &'static str, // one-line summary
    pub long: &'static str,  // full explanation for --explain
}

/// All stable error codes.
pub static REGISTRY: &[ErrorEntry] = &[
    // ── Lexer ────────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "BFY-L001",
        short: "unexpected character",
        long: r#"## BFY-L001: unexpected character

A character was found that does not start any token.

**Example:**

    1 + 2 @ 3

`@` is not an operator or punctuation mark. Identifiers are ASCII
letters followed by letters or digits; `_` and non-ASCII letters are
not accepted either.
"#,
    },
    ErrorEntry {
        code: "BFY-L002",
        short: "invalid escape sequence",
        long: r#"## BFY-L002: invalid escape sequence

Character and string literals accept exactly these escapes:

    \n  \t  \r  \'  \"  \\

**Example that triggers this:**

    "tab\x"
"#,
    },
    ErrorEntry {
        code: "BFY-L003",
        short: "unterminated character literal",
        long: r#"## BFY-L003: unterminated character literal

A character literal is a single character (or one escape) between
single quotes. The closing quote was missing.

**Examples that trigger this:**

    'ab'
    'x
"#,
    },
    ErrorEntry {
        code: "BFY-L004",
        short: "unterminated string literal",
        long: r#"## BFY-L004: unterminated string literal

The input ended before the closing `"` of a string literal.
Strings may span lines, so the error points at the opening quote.
"#,
    },

    // ── Parser ───────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "BFY-P001",
        short: "integer literal out of range",
        long: r#"## BFY-P001: integer literal out of range

Integer literals must fit in a signed 64-bit integer
(at most 9223372036854775807).

**Example that triggers this:**

    1 + 99999999999999999999

Parsing continues past the bad literal so every such error is
reported at once.
"#,
    },
    ErrorEntry {
        code: "BFY-P002",
        short: "expected integer literal",
        long: r#"## BFY-P002: expected integer literal

Expressions are integers joined by `+` and `-`:

    12 + 7 - 5

Every operand position must hold an integer. Identifiers, keywords,
character and string literals are recognised by the tokenizer but
are not valid operands, and an expression may not end with an
operator.
"#,
    },

    // ── Compiler ─────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "BFY-C001",
        short: "malformed expression",
        long: r#"## BFY-C001: malformed expression

The tree handed to the compiler still contains a node that failed to
parse. Check the parser's errors before compiling.
"#,
    },
    ErrorEntry {
        code: "BFY-C002",
        short: "constant pool overflow",
        long: r#"## BFY-C002: constant pool overflow

`OpConstant` addresses the constant pool with a 16-bit operand, so a
single program can hold at most 65536 literals.
"#,
    },

    // ── Runtime ──────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "BFY-R001",
        short: "stack overflow",
        long: r#"## BFY-R001: stack overflow

A push found the value stack full. Execution stops and the stack is
left as it was before the failed push. The default capacity is 2048;
use `--stack-size` to change it.
"#,
    },
    ErrorEntry {
        code: "BFY-R002",
        short: "stack underflow",
        long: r#"## BFY-R002: stack underflow

An arithmetic instruction needed two operands but the stack held
fewer. The compiler never emits such code; the bytecode was built
by hand or corrupted.
"#,
    },
    ErrorEntry {
        code: "BFY-R003",
        short: "unknown opcode",
        long: r#"## BFY-R003: unknown opcode

The instruction stream contains a byte that is not an opcode. Only
`OpConstant` (0), `OpAdd` (1) and `OpSub` (2) exist.
"#,
    },
    ErrorEntry {
        code: "BFY-R004",
        short: "truncated instruction",
        long: r#"## BFY-R004: truncated instruction

The instruction stream ended in the middle of an instruction's
operands.
"#,
    },
    ErrorEntry {
        code: "BFY-R005",
        short: "constant index out of range",
        long: r#"## BFY-R005: constant index out of range

An `OpConstant` operand points past the end of the constant pool.
Instructions and constants are only meaningful as the pair the
compiler produced.
"#,
    },
    ErrorEntry {
        code: "BFY-R006",
        short: "stack allocation failed",
        long: r#"## BFY-R006: stack allocation failed

The VM allocates its whole value stack up front. The requested
capacity could not be allocated, so nothing was run.

**Example:**

    butterfly --stack-size 18446744073709551615 prog.bfy
"#,
    },

    // ── Warnings ─────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "BFY-W001",
        short: "trailing input ignored",
        long: r#"## BFY-W001: trailing input ignored

A program is a single expression. Tokens after the first complete
expression are not read:

    1 + 2 3

evaluates to 3 and ignores the trailing `3`.
"#,
    },
];

/// Look up an error entry by code (e.g. `"BFY-P001"`).
pub fn lookup(code: &str) -> Option<&'static ErrorEntry> {
    REGISTRY.iter().find(|e| e.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{LexError, LexErrorKind};
    use crate::vm::{CompileError, VmError};
    use crate::ast::Span;

    #[test]
    fn lookup_known_code() {
        let e = lookup("BFY-P001").expect("BFY-P001 should be in registry");
        assert_eq!(e.code, "BFY-P001");
        assert!(!e.short.is_empty());
        assert!(e.long.contains("BFY-P001"));
        assert!(lookup("bfy-p001").is_some());
    }

    #[test]
    fn lookup_unknown_returns_none() {
        assert!(lookup("BFY-XXXX").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn all_codes_unique() {
        let mut codes: Vec<&str> = REGISTRY.iter().map(|e| e.code).collect();
        codes.sort_unstable();
        let len_before = codes.len();
        codes.dedup();
        assert_eq!(codes.len(), len_before, "duplicate codes in registry");
    }

    #[test]
    fn all_codes_have_content() {
        for entry in REGISTRY {
            assert!(!entry.short.is_empty(), "{} missing short description", entry.code);
            assert!(entry.long.contains(entry.code), "{} long text lacks its heading", entry.code);
        }
    }

    #[test]
    fn every_emitted_code_is_registered() {
        let lex_kinds = [
            LexErrorKind::UnexpectedCharacter('@'),
            LexErrorKind::InvalidEscape('q'),
            LexErrorKind::UnterminatedChar,
            LexErrorKind::UnterminatedString,
        ];
        let mut codes: Vec<&str> = lex_kinds
            .into_iter()
            .map(|kind| LexError { kind, span: Span::UNKNOWN, line: 1, column: 1 }.code())
            .collect();
        codes.extend(["BFY-P001", "BFY-P002", "BFY-W001"]);
        codes.push(CompileError::ConstantPoolOverflow.code());
        codes.push(
            CompileError::MalformedExpression { lexeme: String::new(), line: 1, column: 1, span: Span::UNKNOWN }
                .code(),
        );
        codes.extend(
            [
                VmError::StackOverflow { capacity: 1, ip: 0 },
                VmError::StackUnderflow { ip: 0 },
                VmError::UnknownOpcode { op: 9, ip: 0 },
                VmError::TruncatedInstruction { name: "OpConstant", ip: 0 },
                VmError::ConstantOutOfRange { index: 1, len: 0 },
                VmError::StackAllocation { capacity: usize::MAX },
            ]
            .iter()
            .map(VmError::code),
        );
        for code in codes {
            assert!(lookup(code).is_some(), "{code} is emitted but not registered");
        }
    }
}
