#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Next piece of input text. File mode sends the whole file as one chunk.
    InputChunk(String),
    /// The input source is exhausted.
    EndOfInput,
}
