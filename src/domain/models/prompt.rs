use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Generation parameters sent as the `system_prompt` field of a stream
/// request. When a send carries no override the field is omitted entirely and
/// the backend falls back to the prompt configured for the session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptOverride {
    pub nombre: String,
    pub contenido_instruccion: String,
    pub temperatura: f64,
    pub top_p: f64,
    pub penalizacion_frecuencia: f64,
    pub tokens_maximos: u32,
}
