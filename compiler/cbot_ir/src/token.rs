//! Token ids and token kinds.
//!
//! `TokenId` enumerates every keyword and operator of the language. The
//! operator entries double as the longest-match table used by the
//! tokenizer: `>>>=` wins over `>>=` over `>>` over `>`.

use std::fmt;

/// What kind of lexical unit a token is.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Reserved word or operator.
    Keyword(TokenId),
    /// Identifier (variable, function, class or label name).
    Ident,
    /// Numeric literal (decimal, `0x` hex, `0b` binary).
    Number,
    /// String literal including its quotes.
    Str,
    /// Character literal including its quotes.
    Char,
    /// Identifier registered as a named numeric constant.
    Constant(i64),
    /// End-of-stream sentinel.
    End,
}

macro_rules! token_ids {
    (
        keywords { $($kw:ident => ($kw_text:literal, $kw_name:literal),)* }
        operators { $($op:ident => ($op_text:literal, $op_name:literal),)* }
    ) => {
        /// Every keyword and operator of the language.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum TokenId {
            $($kw,)*
            $($op,)*
        }

        impl TokenId {
            /// Word keywords, in table order.
            pub const KEYWORDS: &'static [TokenId] = &[$(TokenId::$kw,)*];

            /// Operators and punctuation, in table order.
            pub const OPERATORS: &'static [TokenId] = &[$(TokenId::$op,)*];

            /// Source text of this keyword or operator.
            pub const fn text(self) -> &'static str {
                match self {
                    $(TokenId::$kw => $kw_text,)*
                    $(TokenId::$op => $op_text,)*
                }
            }

            /// Traditional `ID_*` name, used by the `lex` command output.
            pub const fn name(self) -> &'static str {
                match self {
                    $(TokenId::$kw => $kw_name,)*
                    $(TokenId::$op => $op_name,)*
                }
            }

            /// Look up a word keyword.
            pub fn keyword(word: &str) -> Option<TokenId> {
                match word {
                    $($kw_text => Some(TokenId::$kw),)*
                    _ => None,
                }
            }

            /// Look up an operator by its exact text.
            pub fn operator(text: &str) -> Option<TokenId> {
                match text {
                    $($op_text => Some(TokenId::$op),)*
                    _ => None,
                }
            }
        }
    };
}

token_ids! {
    keywords {
        If => ("if", "ID_IF"),
        Else => ("else", "ID_ELSE"),
        While => ("while", "ID_WHILE"),
        Do => ("do", "ID_DO"),
        For => ("for", "ID_FOR"),
        Break => ("break", "ID_BREAK"),
        Continue => ("continue", "ID_CONTINUE"),
        Switch => ("switch", "ID_SWITCH"),
        Case => ("case", "ID_CASE"),
        Default => ("default", "ID_DEFAULT"),
        Try => ("try", "ID_TRY"),
        Throw => ("throw", "ID_THROW"),
        Catch => ("catch", "ID_CATCH"),
        Finally => ("finally", "ID_FINALLY"),
        TxtAnd => ("and", "ID_TXT_AND"),
        TxtOr => ("or", "ID_TXT_OR"),
        TxtNot => ("not", "ID_TXT_NOT"),
        Return => ("return", "ID_RETURN"),
        Class => ("class", "ID_CLASS"),
        Extends => ("extends", "ID_EXTENDS"),
        Synchronized => ("synchronized", "ID_SYNCHO"),
        New => ("new", "ID_NEW"),
        Public => ("public", "ID_PUBLIC"),
        Extern => ("extern", "ID_EXTERN"),
        Static => ("static", "ID_STATIC"),
        Protected => ("protected", "ID_PROTECTED"),
        Private => ("private", "ID_PRIVATE"),
        Repeat => ("repeat", "ID_REPEAT"),
        Int => ("int", "ID_INT"),
        Float => ("float", "ID_FLOAT"),
        Boolean => ("boolean", "ID_BOOLEAN"),
        String => ("string", "ID_STRING"),
        Void => ("void", "ID_VOID"),
        Bool => ("bool", "ID_BOOL"),
        Byte => ("byte", "ID_BYTE"),
        Short => ("short", "ID_SHORT"),
        Char => ("char", "ID_CHAR"),
        Long => ("long", "ID_LONG"),
        Double => ("double", "ID_DOUBLE"),
        True => ("true", "ID_TRUE"),
        False => ("false", "ID_FALSE"),
        Null => ("null", "ID_NULL"),
        Nan => ("nan", "ID_NAN"),
    }
    operators {
        OpenPar => ("(", "ID_OPENPAR"),
        ClosePar => (")", "ID_CLOSEPAR"),
        OpenBlock => ("{", "ID_OPBLK"),
        CloseBlock => ("}", "ID_CLBLK"),
        Semicolon => (";", "ID_SEP"),
        Comma => (",", "ID_COMMA"),
        Colon => (":", "ID_DOTS"),
        Dot => (".", "ID_DOT"),
        OpenBracket => ("[", "ID_OPBRK"),
        CloseBracket => ("]", "ID_CLBRK"),
        DoubleColon => ("::", "ID_DBLDOTS"),
        Question => ("?", "ID_LOGIC"),
        Add => ("+", "ID_ADD"),
        Sub => ("-", "ID_SUB"),
        Mul => ("*", "ID_MUL"),
        Div => ("/", "ID_DIV"),
        Assign => ("=", "ID_ASS"),
        AssignAdd => ("+=", "ID_ASSADD"),
        AssignSub => ("-=", "ID_ASSSUB"),
        AssignMul => ("*=", "ID_ASSMUL"),
        AssignDiv => ("/=", "ID_ASSDIV"),
        AssignOr => ("|=", "ID_ASSOR"),
        AssignAnd => ("&=", "ID_ASSAND"),
        AssignXor => ("^=", "ID_ASSXOR"),
        AssignShl => ("<<=", "ID_ASSSL"),
        AssignUshr => (">>>=", "ID_ASSSR"),
        AssignShr => (">>=", "ID_ASSASR"),
        Shl => ("<<", "ID_SL"),
        Ushr => (">>>", "ID_SR"),
        Shr => (">>", "ID_ASR"),
        Inc => ("++", "ID_INC"),
        Dec => ("--", "ID_DEC"),
        Lt => ("<", "ID_LO"),
        Gt => (">", "ID_HI"),
        Le => ("<=", "ID_LS"),
        Ge => (">=", "ID_HS"),
        Eq => ("==", "ID_EQ"),
        Ne => ("!=", "ID_NE"),
        BitAnd => ("&", "ID_AND"),
        BitXor => ("^", "ID_XOR"),
        BitOr => ("|", "ID_OR"),
        LogAnd => ("&&", "ID_LOG_AND"),
        LogOr => ("||", "ID_LOG_OR"),
        LogNot => ("!", "ID_LOG_NOT"),
        BitNot => ("~", "ID_NOT"),
        Modulo => ("%", "ID_MODULO"),
        Power => ("**", "ID_POWER"),
        AssignModulo => ("%=", "ID_ASSMODULO"),
    }
}

impl TokenId {
    /// Longest operator text in the table.
    pub const MAX_OPERATOR_LEN: usize = 4;

    /// Longest operator that is a prefix of `text`.
    pub fn longest_operator(text: &str) -> Option<TokenId> {
        let max = text.len().min(Self::MAX_OPERATOR_LEN);
        (1..=max)
            .rev()
            .filter(|&len| text.is_char_boundary(len))
            .find_map(|len| Self::operator(&text[..len]))
    }

    /// Primitive type keywords (`int`, `float`, `string`, ...).
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            TokenId::Int
                | TokenId::Float
                | TokenId::Boolean
                | TokenId::String
                | TokenId::Void
                | TokenId::Bool
                | TokenId::Byte
                | TokenId::Short
                | TokenId::Char
                | TokenId::Long
                | TokenId::Double
        )
    }

    /// Simple and compound assignment operators.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            TokenId::Assign
                | TokenId::AssignAdd
                | TokenId::AssignSub
                | TokenId::AssignMul
                | TokenId::AssignDiv
                | TokenId::AssignOr
                | TokenId::AssignAnd
                | TokenId::AssignXor
                | TokenId::AssignShl
                | TokenId::AssignUshr
                | TokenId::AssignShr
                | TokenId::AssignModulo
        )
    }

    /// Declaration modifiers.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenId::Public
                | TokenId::Private
                | TokenId::Protected
                | TokenId::Static
                | TokenId::Extern
                | TokenId::Synchronized
        )
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
