use crate::vvlib::{CompoundField, ParsedTable, Transform, Value, Vocabulary};

pub const ZYGOSITY_COLUMN: &str = "ZIGOSITY";
pub const HOM: &str = "HOM";
pub const HET: &str = "HET";

/// Value stored for a present INFO flag
pub const FLAG_SET: &str = "true";

/// Flag set -> HOM, anything else (unset included) -> HET
pub fn zygosity_from_flag(flag: &Value) -> &'static str {
    match flag {
        Value::Text(s) if s == FLAG_SET => HOM,
        Value::Number(x) if *x != 0.0 => HOM,
        _ => HET,
    }
}

/// All called alleles identical and non-reference -> HOM, otherwise HET
pub fn zygosity_from_genotype(gt: &str) -> &'static str {
    let alleles: Vec<&str> = gt.split(['/', '|']).collect();
    let first = alleles[0];
    if first != "0" && first != "." && alleles.iter().all(|a| *a == first) {
        HOM
    } else {
        HET
    }
}

/// Removes the parentheses some annotators wrap per-allele lists in
pub fn strip_parentheses(raw: &str) -> String {
    raw.replace(['(', ')'], "")
}

fn apply_transform(transform: &Transform, piece: &str) -> Value {
    match transform {
        Transform::Keep => Value::from_raw(piece),
        Transform::Percent => match piece.trim().parse::<f64>() {
            Ok(x) => Value::from(x / 100.0),
            Err(_) => Value::from_raw(piece),
        },
        Transform::TrimPunctuation => Value::from_raw(piece.trim_matches(['.', ','])),
        Transform::FirstItem => Value::from_raw(piece.split(',').next().unwrap_or_default()),
    }
}

/// Replaces `field.column` with one column per target
pub fn split_compound(table: &mut ParsedTable, field: &CompoundField) {
    if !table.has_column(&field.column) {
        return;
    }

    let n_targets = field.targets.len();
    for row in table.rows_mut() {
        let raw = match row.take(&field.column) {
            Value::Missing => None,
            value => Some(value.to_string()),
        };
        let pieces: Vec<&str> = match &raw {
            Some(text) => text.splitn(n_targets, field.delimiter).collect(),
            None => vec![],
        };
        for (idx, target) in field.targets.iter().enumerate() {
            let value = pieces
                .get(idx)
                .map(|p| apply_transform(&target.transform, p))
                .unwrap_or_default();
            row.set(&target.name, value);
        }
    }

    for target in field.targets.iter() {
        table.add_column(&target.name);
    }
    table.drop_column(&field.column);
}

/// Substring replacement of every code with its label, in table order
pub fn translate(table: &mut ParsedTable, vocabulary: &Vocabulary) {
    table.map_column(&vocabulary.column, |value| match value {
        Value::Missing => Value::Missing,
        other => {
            let mut text = other.to_string();
            for (code, label) in vocabulary.codes.iter() {
                text = text.replace(code.as_str(), label);
            }
            Value::Text(text)
        }
    });
}

/// `CHANGE` when a protein change alters the residue, else missing
pub fn amino_change(hgvs_p: &Value) -> Value {
    let Value::Text(text) = hgvs_p else {
        return Value::Missing;
    };
    let residues: Vec<char> = text.replace("p.", "").chars().collect();
    let head: String = residues.iter().take(3).collect();
    let tail: String = residues[residues.len().saturating_sub(3)..].iter().collect();
    if head != tail {
        Value::Text("CHANGE".to_string())
    } else {
        Value::Missing
    }
}
