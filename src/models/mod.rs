mod declaration;
mod identifier;
mod request;

pub use declaration::{DeclarationKind, DeclarationNode, HostNode, Modifier, Origin};
pub use identifier::Identifier;
pub use request::{Document, GeneratedFragment, GenerationMode, GenerationRequest, TypePath};
