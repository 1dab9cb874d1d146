//! Generated code model: the document IR, the text buffer runtime and the C#
//! emitter.

pub mod document;
pub mod emitter;
pub mod text_buffer;

pub use document::{
    csharp_string_literal, CodeAttribute, CodeClass, CodeConstructor, CodeDocument, CodeField,
    CodeMethod, CodeProperty, LinePragma, Member, MemberModifiers, Parameter, Statement,
    TypeReference, TypeVisibility, HELPER_RESULT_TYPE,
};
pub use emitter::CSharpEmitter;
pub use text_buffer::TextBuffer;
