// src/common/csv_export.rs

/// Marca de ordem de bytes: faz o Excel abrir o arquivo como UTF-8.
pub const UTF8_BOM: char = '\u{FEFF}';

/// Qualquer coisa que sabe virar uma linha de planilha.
pub trait CsvRow {
    fn headers() -> &'static [&'static str];
    fn fields(&self) -> Vec<String>;
}

/// Escapa um campo: se tiver vírgula, aspas ou quebra de linha,
/// envolve em aspas e duplica as aspas internas.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn push_line(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let line: Vec<String> = fields.into_iter().map(|f| escape_field(&f)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

/// Monta o CSV completo (BOM + cabeçalho + linhas).
pub fn to_csv<T: CsvRow>(rows: &[T]) -> String {
    let mut out = String::new();
    out.push(UTF8_BOM);
    push_line(&mut out, T::headers().iter().map(|h| h.to_string()));
    for row in rows {
        push_line(&mut out, row.fields());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Linha {
        nome: String,
        obs: String,
    }

    impl CsvRow for Linha {
        fn headers() -> &'static [&'static str] {
            &["Nome", "Observações"]
        }
        fn fields(&self) -> Vec<String> {
            vec![self.nome.clone(), self.obs.clone()]
        }
    }

    #[test]
    fn output_starts_with_bom_and_header() {
        let csv = to_csv::<Linha>(&[]);
        assert!(csv.starts_with('\u{FEFF}'));
        assert_eq!(&csv[UTF8_BOM.len_utf8()..], "Nome,Observações\r\n");
    }

    #[test]
    fn commas_and_quotes_are_escaped() {
        let rows = vec![Linha {
            nome: "Aço, Ferro & Cia".into(),
            obs: "entrega \"rápida\"".into(),
        }];
        let csv = to_csv(&rows);
        let body = csv.lines().nth(1).unwrap();
        assert_eq!(body, "\"Aço, Ferro & Cia\",\"entrega \"\"rápida\"\"\"");
    }

    #[test]
    fn plain_fields_are_left_alone() {
        assert_eq!(escape_field("Papelaria Central"), "Papelaria Central");
        assert_eq!(escape_field("linha1\nlinha2"), "\"linha1\nlinha2\"");
    }
}
