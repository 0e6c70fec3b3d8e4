//! Error codes for compilation and execution.
//!
//! Codes 5000-5055 are raised by the compiler, 6000-6015 at run time. The
//! numeric values are part of the language: scripts catch runtime errors
//! by code (`catch (CBotErrZeroDiv)`), and every code is predefined as a
//! named constant under its `name()`.

use std::fmt;

macro_rules! error_codes {
    ($($(#[$doc:meta])* $variant:ident = $value:literal, $msg:literal;)*) => {
        /// Every error the compiler or the execution machine can report.
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        #[repr(i32)]
        pub enum ErrorCode {
            $($(#[$doc])* $variant = $value,)*
        }

        impl ErrorCode {
            /// All codes in numeric order.
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$variant,)*];

            /// Map a numeric code back to a known error.
            pub fn from_code(code: i32) -> Option<ErrorCode> {
                match code {
                    $($value => Some(ErrorCode::$variant),)*
                    _ => None,
                }
            }

            /// Constant name scripts use to refer to this code.
            pub const fn name(self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => concat!("CBotErr", stringify!($variant)),)*
                }
            }

            /// User-facing description.
            pub const fn message(self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => $msg,)*
                }
            }
        }
    };
}

error_codes! {
    // Compile errors (5xxx)
    OpenPar = 5000, "opening parenthesis missing";
    ClosePar = 5001, "closing parenthesis missing";
    NotBoolean = 5002, "the expression must return a boolean value";
    UndefVar = 5003, "variable not declared";
    /// Assignment target is not a variable, field or array element.
    BadLeft = 5004, "assignment impossible";
    NoTerminator = 5005, "semicolon terminator missing";
    CaseOut = 5006, "instruction \"case\" outside a block \"switch\"";
    NoEnd = 5007, "instructions after the final closing brace";
    CloseBlock = 5008, "end of block missing";
    ElseWhitoutIf = 5009, "instruction \"else\" without corresponding \"if\"";
    OpenBlock = 5010, "opening brace missing";
    BadType1 = 5011, "wrong type for the assignment";
    RedefVar = 5012, "a variable can not be declared twice";
    BadType2 = 5013, "the types of the two operands are incompatible";
    UndefCall = 5014, "unknown function";
    NoDoubleDots = 5015, "sign \" : \" missing";
    NoWhile = 5016, "keyword \"while\" missing";
    BreakOutside = 5017, "instruction \"break\" outside a loop";
    Label = 5018, "a label must be followed by \"for\", \"while\", \"do\" or \"repeat\"";
    UndefLabel = 5019, "this label does not exist";
    NoCase = 5020, "instruction \"case\" missing";
    BadNum = 5021, "number missing";
    Void = 5022, "void parameter";
    NoType = 5023, "type declaration missing";
    NoVar = 5024, "variable name missing";
    NoFunc = 5025, "function name missing";
    OverParam = 5026, "too many parameters";
    RedefFunc = 5027, "function already exists";
    LowParam = 5028, "parameters missing";
    BadParam = 5029, "no function with this name accepts this kind of parameter";
    NbParam = 5030, "no function with this name accepts this number of parameters";
    UndefItem = 5031, "this is not a member of this class";
    UndefClass = 5032, "this object is not a member of a class";
    NoConstruct = 5033, "appropriate constructor missing";
    RedefClass = 5034, "this class already exists";
    CloseIndex = 5035, "\" ] \" missing";
    Reserved = 5036, "reserved keyword of the language";
    BadNew = 5037, "bad argument for \"new\"";
    OpenIndex = 5038, "\" [ \" expected";
    BadString = 5039, "string missing";
    BadIndex = 5040, "incorrect index type";
    Private = 5041, "private element";
    NoPublic = 5042, "public required";
    NoExpression = 5043, "expression expected";
    AmbiguousCall = 5044, "ambiguous call to overloaded function";
    NoClassName = 5045, "class name expected";
    NoReturn = 5046, "non-void function needs \"return;\"";
    DefaultValue = 5047, "this parameter needs a default value";
    EndQuote = 5048, "missing end quote";
    BadEscape = 5049, "unknown escape sequence";
    OctalRange = 5050, "octal value out of range";
    HexDigits = 5051, "missing hex digits after escape sequence";
    HexRange = 5052, "hex value out of range";
    UnicodeName = 5053, "invalid universal character name";
    CharEmpty = 5054, "empty character constant";
    RedefCase = 5055, "duplicate label in switch";

    // Runtime errors (6xxx)
    ZeroDiv = 6000, "dividing by zero";
    NotInit = 6001, "variable not initialized";
    BadThrow = 6002, "negative value rejected by \"throw\"";
    NoRetVal = 6003, "the function returned no value";
    NoRun = 6004, "no function running";
    UndefFunc = 6005, "calling an unknown function";
    NotClass = 6006, "this class does not exist";
    Null = 6007, "unknown object";
    Nan = 6008, "operation impossible with value \"nan\"";
    OutArray = 6009, "access beyond array limit";
    StackOver = 6010, "stack overflow";
    DeletedPtr = 6011, "illegal object";
    FileOpen = 6012, "can't open file";
    NotOpen = 6013, "file not open";
    Read = 6014, "read error";
    Write = 6015, "write error";
}

impl ErrorCode {
    /// Numeric value of this code.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Raised by the execution machine rather than the compiler.
    #[inline]
    pub const fn is_runtime(self) -> bool {
        self.code() >= 6000
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests;
