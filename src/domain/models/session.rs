use serde_derive::Deserialize;
use serde_derive::Serialize;

/// A persisted chat session as the backend reports it. Field names are the
/// backend's wire format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id_session: String,
    pub titulo: String,
    pub caso_id: Option<i64>,
    pub system_prompt_id: Option<i64>,
    pub es_activo: bool,
    pub fecha_creacion: String,
    pub ultimo_acceso: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatSessionCreate {
    pub titulo: String,
    pub caso_id: i64,
    pub system_prompt_id: i64,
}

impl ChatSession {
    pub fn describe(&self) -> String {
        let mut res = format!(
            "- ({id}) {titulo}, último acceso: {acceso}",
            id = self.id_session,
            titulo = self.titulo,
            acceso = self.ultimo_acceso,
        );

        if !self.es_activo {
            res = format!("{res} (archivada)");
        }

        return res;
    }
}
