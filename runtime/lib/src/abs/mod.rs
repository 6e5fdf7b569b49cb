use core::fmt::{self, Display};

use derive_more as dm;
use serde::Serialize;

pub use common::types::{
    ArgIndex, ArrayIndex, FieldId, InstructionId, LocalIndex, ObjectId, OperandIndex,
};

/// The taint bitmask tracked for every value.
/// Bit 0 marks a value that is tied to a symbolic counterpart; the rest are reserved.
/// Combining flags is bitwise OR: any symbolic input taints the result.
/// The shadow state stores only the symbolic bit; reserved bits live as long as
/// the accumulator of an instruction.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    dm::BitOr,
    dm::BitOrAssign,
    dm::From,
    dm::Into,
    Serialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Flag(u8);

impl Flag {
    const SYMBOLIC_BIT: u8 = 1 << 0;

    pub const CONCRETE: Self = Self(0);
    pub const SYMBOLIC: Self = Self(Self::SYMBOLIC_BIT);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// The flag with the reserved bits cleared, as kept in the shadow state.
    #[inline]
    pub const fn without_reserved(self) -> Self {
        Self(self.0 & Self::SYMBOLIC_BIT)
    }

    #[inline]
    pub const fn is_symbolic(self) -> bool {
        self.0 & Self::SYMBOLIC_BIT != 0
    }

    #[inline]
    pub const fn is_concrete(self) -> bool {
        !self.is_symbolic()
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_symbolic() {
            write!(f, "Sym({:#04b})", self.0)
        } else {
            write!(f, "Conc({:#04b})", self.0)
        }
    }
}

/// What a variable slot, a field, or an element holds in the shadow state.
/// Reference-typed content does not carry a flag itself: it delegates to the
/// shadow heap entry of the object it denotes, so all aliases of an object
/// observe the same flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ShadowValue {
    #[default]
    Concrete,
    Symbolic,
    Reference(ObjectId),
}

impl ShadowValue {
    #[inline]
    pub const fn from_flag(flag: Flag) -> Self {
        if flag.is_symbolic() {
            Self::Symbolic
        } else {
            Self::Concrete
        }
    }

    pub const fn is_concrete(&self) -> bool {
        matches!(self, Self::Concrete)
    }

    pub const fn as_reference(&self) -> Option<ObjectId> {
        match self {
            Self::Reference(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<Flag> for ShadowValue {
    fn from(flag: Flag) -> Self {
        Self::from_flag(flag)
    }
}

impl Display for ShadowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete => write!(f, "Conc"),
            Self::Symbolic => write!(f, "Sym"),
            Self::Reference(id) => write!(f, "Ref(@{id:#x})"),
        }
    }
}

/// The concrete value of an operand as observed in the target program.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConcreteValue {
    Bool(bool),
    /// A UTF-16 code unit; lone surrogates are valid values.
    Char(u16),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Null,
    Reference(ObjectId),
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ConcreteValue {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    u16 => Char,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
}

impl Display for ConcreteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => match char::from_u32(*v as u32) {
                Some(c) => write!(f, "{c:?}"),
                None => write!(f, "'\\u{{{v:x}}}'"),
            },
            Self::Byte(v) => write!(f, "{v}i8"),
            Self::Short(v) => write!(f, "{v}i16"),
            Self::Int(v) => write!(f, "{v}i32"),
            Self::Long(v) => write!(f, "{v}i64"),
            Self::Float(v) => write!(f, "{v}f32"),
            Self::Double(v) => write!(f, "{v}f64"),
            Self::Null => write!(f, "null"),
            Self::Reference(id) => write!(f, "@{id:#x}"),
        }
    }
}

/// A location the instrumented program reads from or writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, dm::Display)]
pub enum Location {
    #[display("this")]
    This,
    #[display("arg{_0}")]
    Argument(ArgIndex),
    #[display("local{_0}")]
    Local(LocalIndex),
    #[display("static#{_0}")]
    Static(FieldId),
    #[display("@{_0:#x}.#{_1}")]
    Field(ObjectId, FieldId),
    #[display("@{_0:#x}[{_1}]")]
    Element(ObjectId, ArrayIndex),
    /// The value most recently returned by a callee on this thread.
    #[display("ret")]
    ReturnValue,
}

/// The position a read value is forwarded to when it crosses a call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, dm::Display)]
pub enum CallPosition {
    #[display("receiver")]
    Receiver,
    #[display("arg{_0}")]
    Argument(ArgIndex),
    /// The value is being returned to the caller.
    #[display("return")]
    Return,
}

/// The operand side of a read hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operand {
    pub instruction: InstructionId,
    pub position: OperandIndex,
    pub value: ConcreteValue,
    pub forward: Option<CallPosition>,
}

impl Operand {
    pub fn new(
        instruction: InstructionId,
        position: OperandIndex,
        value: impl Into<ConcreteValue>,
    ) -> Self {
        Self {
            instruction,
            position,
            value: value.into(),
            forward: None,
        }
    }

    pub fn forwarded_to(mut self, position: CallPosition) -> Self {
        self.forward = Some(position);
        self
    }
}

/// The kind of value a write hook stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrittenValue {
    Primitive,
    /// `None` stands for the null reference, which has no identity to delegate to.
    Reference(Option<ObjectId>),
}
