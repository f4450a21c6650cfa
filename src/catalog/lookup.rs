use std::collections::HashMap;

use crate::model::FileKind;

use super::{CatalogError, FileDescriptor, PatientDetails, Result};

/// Read-only index over the patient's known files.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    patient: PatientDetails,
    by_id: HashMap<String, usize>,
}

impl FileCatalog {
    pub fn new(patient: PatientDetails) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(patient.files.len());
        for (index, file) in patient.files.iter().enumerate() {
            if by_id.insert(file.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateFile(file.id.clone()));
            }
        }
        Ok(Self { patient, by_id })
    }

    pub fn patient(&self, patient_id: &str) -> Result<&PatientDetails> {
        if patient_id == self.patient.patient_id {
            Ok(&self.patient)
        } else {
            Err(CatalogError::PatientNotFound(patient_id.to_string()))
        }
    }

    pub fn files(&self) -> &[FileDescriptor] {
        &self.patient.files
    }

    pub fn resolve(&self, file_id: &str) -> Result<&FileDescriptor> {
        self.by_id
            .get(file_id)
            .map(|index| &self.patient.files[*index])
            .ok_or_else(|| CatalogError::FileNotFound(file_id.to_string()))
    }

    pub fn resolve_as(&self, file_id: &str, kind: FileKind) -> Result<&FileDescriptor> {
        let descriptor = self.resolve(file_id)?;
        if descriptor.kind != kind {
            return Err(CatalogError::WrongKind {
                id: file_id.to_string(),
                requested: kind,
                actual: descriptor.kind,
            });
        }
        Ok(descriptor)
    }
}
