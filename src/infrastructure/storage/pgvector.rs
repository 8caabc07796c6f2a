//! pgvector text encoding
//!
//! Vectors travel as their text literal (`[0.1,0.2,...]`) and are cast with
//! `::vector` on the SQL side, so no extra sqlx type mapping is needed.

pub fn embedding_to_pgvector(embedding: &[f32]) -> String {
    let values: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_to_pgvector() {
        assert_eq!(embedding_to_pgvector(&[0.5, -1.0, 2.0]), "[0.5,-1,2]");
        assert_eq!(embedding_to_pgvector(&[]), "[]");
    }
}
