use crate::vvlib::AnnotationLayout;
use noodles_vcf::{
    self as vcf,
    header::record::value::map::info::{Number, Type},
};
use std::collections::HashSet;

/// What the source's own header declares about its INFO fields and samples.
/// Field ids are kept upper case.
#[derive(Debug, Clone)]
pub struct SourceHeader {
    /// First sample column, if any
    pub sample: Option<String>,
    /// INFO ids typed Integer or Float
    pub numeric: HashSet<String>,
    /// INFO ids typed Flag
    pub flags: HashSet<String>,
    /// INFO ids declared Number=A
    pub per_allele: HashSet<String>,
    /// Sub-field layout of the packed annotation field, when declared
    pub annotation: Option<AnnotationLayout>,
    /// FORMAT declares GT
    pub has_genotype: bool,
}

impl SourceHeader {
    pub fn new(header: &vcf::Header, annotation_field: &str) -> std::result::Result<Self, String> {
        let mut numeric = HashSet::new();
        let mut flags = HashSet::new();
        let mut per_allele = HashSet::new();

        for (id, info) in header.infos() {
            let upper = id.to_uppercase();
            match info.ty() {
                Type::Integer | Type::Float => {
                    numeric.insert(upper.clone());
                }
                Type::Flag => {
                    flags.insert(upper.clone());
                }
                _ => {}
            }
            if matches!(info.number(), Number::AlternateBases) {
                per_allele.insert(upper);
            }
        }

        let annotation = match header.infos().get(annotation_field) {
            Some(info) => Some(AnnotationLayout::from_description(info.description())?),
            None => None,
        };

        Ok(Self {
            sample: header.sample_names().iter().next().cloned(),
            numeric,
            flags,
            per_allele,
            annotation,
            has_genotype: header.formats().contains_key("GT"),
        })
    }
}
