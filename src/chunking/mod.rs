/*!
 * Source chunking.
 *
 * This module splits large inputs into bounded, boundary-respecting chunks:
 * - `model`: the `Chunk` type and `ChunkConfig`
 * - `boundaries`: line indexing and syntax-tree statement boundaries
 * - `chunker`: the `CodeChunker` splitting strategies and round-trip validation
 */

mod boundaries;
pub mod chunker;
pub mod model;

pub use chunker::{validate_chunks, ChunkStream, CodeChunker};
pub use model::{Chunk, ChunkConfig, ChunkMetadata};
