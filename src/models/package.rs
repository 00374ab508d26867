use crate::store::Document;
use crate::utils::fields::{as_amount, as_bool, as_int, as_text};

/// Tour/transfer package (pacote). Read-only here; only the fields the
/// conversion falls back on are lifted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    pub id: String,
    pub titulo: String,
    pub preco: Option<f64>,
    pub is_ida_e_volta: Option<bool>,
    pub porcentagem_sinal: Option<i64>,
}

impl From<Document> for Package {
    fn from(doc: Document) -> Self {
        let data = &doc.data;
        Self {
            titulo: data.get("titulo").and_then(as_text).unwrap_or_default(),
            preco: data.get("preco").and_then(as_amount),
            is_ida_e_volta: data.get("isIdaEVolta").and_then(as_bool),
            porcentagem_sinal: data.get("porcentagemSinal").and_then(as_int),
            id: doc.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_package_fields() {
        let doc = Document::new(
            "p1",
            json!({ "titulo": "Genipabu", "preco": "R$ 180,00", "porcentagemSinal": "30" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let package = Package::from(doc);

        assert_eq!(package.id, "p1");
        assert_eq!(package.preco, Some(180.0));
        assert_eq!(package.porcentagem_sinal, Some(30));
        assert_eq!(package.is_ida_e_volta, None);
    }
}
