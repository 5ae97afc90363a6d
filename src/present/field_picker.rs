//! Field selection over the exposable whitelist

use crate::core::error::RepresentationBuilderError;
use crate::core::field::FieldValue;
use crate::present::presenter::Presenter;

/// Fills a presenter's data with the effective field set
///
/// With no `fields` parameter (or a blank one) the full exposable list is
/// used in descriptor order. Otherwise the requested fields are used in
/// client order — strict-fail: a requested field outside the whitelist is an
/// error citing `fields=<name>`, never silently dropped.
///
/// Each value comes from the descriptor's computed accessor when one is
/// declared for the field, else from the record attribute of the same name.
pub struct FieldPicker<'a, 'p> {
    presenter: &'a mut Presenter<'p>,
}

impl<'a, 'p> FieldPicker<'a, 'p> {
    pub fn new(presenter: &'a mut Presenter<'p>) -> Self {
        Self { presenter }
    }

    pub fn pick(self) -> Result<(), RepresentationBuilderError> {
        let descriptor = self.presenter.descriptor().clone();
        for field in self.fields()? {
            let value = match descriptor.computed(&field) {
                Some(accessor) => accessor(self.presenter.record()),
                None => self
                    .presenter
                    .record()
                    .get(&field)
                    .cloned()
                    .unwrap_or(FieldValue::Null),
            };
            self.presenter.data.insert(field, value.into_json());
        }
        Ok(())
    }

    fn fields(&self) -> Result<Vec<String>, RepresentationBuilderError> {
        let descriptor = self.presenter.descriptor();
        let exposable = descriptor.exposable_fields();

        let Some(raw) = self.presenter.params().fields() else {
            return Ok(exposable.iter().cloned().collect());
        };

        let mut picked = Vec::new();
        for field in raw.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            if !exposable.contains(field) {
                return Err(RepresentationBuilderError::new(
                    format!("fields={field}"),
                    format!(
                        "Invalid Field Pick. Allowed fields: ({})",
                        descriptor.exposable_list()
                    ),
                ));
            }
            if !picked.iter().any(|p| p == field) {
                picked.push(field.to_string());
            }
        }

        if picked.is_empty() {
            Ok(exposable.iter().cloned().collect())
        } else {
            Ok(picked)
        }
    }
}
