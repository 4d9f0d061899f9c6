//! Composite resource key and its validation rules.
//!
//! # Responsibility
//! - Resolve type tags against a static registry of FHIR R4 resource types.
//! - Reject malformed ids before they reach storage.
//!
//! # Invariants
//! - A `ResourceKey` can only be built through `ResourceKey::new`, so every
//!   key the store sees has a known type and a well-formed id.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// FHIR id grammar: 1 to 64 characters from `[A-Za-z0-9-.]`.
static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-\.]{1,64}$").expect("valid id regex"));

/// Resource type names defined by FHIR R4.
const R4_RESOURCE_TYPES: &[&str] = &[
    "Account",
    "ActivityDefinition",
    "AdverseEvent",
    "AllergyIntolerance",
    "Appointment",
    "AppointmentResponse",
    "AuditEvent",
    "Basic",
    "Binary",
    "BiologicallyDerivedProduct",
    "BodyStructure",
    "Bundle",
    "CapabilityStatement",
    "CarePlan",
    "CareTeam",
    "CatalogEntry",
    "ChargeItem",
    "ChargeItemDefinition",
    "Claim",
    "ClaimResponse",
    "ClinicalImpression",
    "CodeSystem",
    "Communication",
    "CommunicationRequest",
    "CompartmentDefinition",
    "Composition",
    "ConceptMap",
    "Condition",
    "Consent",
    "Contract",
    "Coverage",
    "CoverageEligibilityRequest",
    "CoverageEligibilityResponse",
    "DetectedIssue",
    "Device",
    "DeviceDefinition",
    "DeviceMetric",
    "DeviceRequest",
    "DeviceUseStatement",
    "DiagnosticReport",
    "DocumentManifest",
    "DocumentReference",
    "EffectEvidenceSynthesis",
    "Encounter",
    "Endpoint",
    "EnrollmentRequest",
    "EnrollmentResponse",
    "EpisodeOfCare",
    "EventDefinition",
    "Evidence",
    "EvidenceVariable",
    "ExampleScenario",
    "ExplanationOfBenefit",
    "FamilyMemberHistory",
    "Flag",
    "Goal",
    "GraphDefinition",
    "Group",
    "GuidanceResponse",
    "HealthcareService",
    "ImagingStudy",
    "Immunization",
    "ImmunizationEvaluation",
    "ImmunizationRecommendation",
    "ImplementationGuide",
    "InsurancePlan",
    "Invoice",
    "Library",
    "Linkage",
    "List",
    "Location",
    "Measure",
    "MeasureReport",
    "Media",
    "Medication",
    "MedicationAdministration",
    "MedicationDispense",
    "MedicationKnowledge",
    "MedicationRequest",
    "MedicationStatement",
    "MedicinalProduct",
    "MedicinalProductAuthorization",
    "MedicinalProductContraindication",
    "MedicinalProductIndication",
    "MedicinalProductIngredient",
    "MedicinalProductInteraction",
    "MedicinalProductManufactured",
    "MedicinalProductPackaged",
    "MedicinalProductPharmaceutical",
    "MedicinalProductUndesirableEffect",
    "MessageDefinition",
    "MessageHeader",
    "MolecularSequence",
    "NamingSystem",
    "NutritionOrder",
    "Observation",
    "ObservationDefinition",
    "OperationDefinition",
    "OperationOutcome",
    "Organization",
    "OrganizationAffiliation",
    "Parameters",
    "Patient",
    "PaymentNotice",
    "PaymentReconciliation",
    "Person",
    "PlanDefinition",
    "Practitioner",
    "PractitionerRole",
    "Procedure",
    "Provenance",
    "Questionnaire",
    "QuestionnaireResponse",
    "RelatedPerson",
    "RequestGroup",
    "ResearchDefinition",
    "ResearchElementDefinition",
    "ResearchStudy",
    "ResearchSubject",
    "RiskAssessment",
    "RiskEvidenceSynthesis",
    "Schedule",
    "SearchParameter",
    "ServiceRequest",
    "Slot",
    "Specimen",
    "SpecimenDefinition",
    "StructureDefinition",
    "StructureMap",
    "Subscription",
    "Substance",
    "SubstanceNucleicAcid",
    "SubstancePolymer",
    "SubstanceProtein",
    "SubstanceReferenceInformation",
    "SubstanceSourceMaterial",
    "SubstanceSpecification",
    "SupplyDelivery",
    "SupplyRequest",
    "Task",
    "TerminologyCapabilities",
    "TestReport",
    "TestScript",
    "ValueSet",
    "VerificationResult",
    "VisionPrescription",
];

/// Returns whether `name` is a resource type the store can persist.
pub fn is_known_resource_type(name: &str) -> bool {
    R4_RESOURCE_TYPES.binary_search(&name).is_ok()
}

/// Why a `(type, id)` pair was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    UnknownType(String),
    MalformedId { resource_type: String, id: String },
}

impl Display for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType(name) => {
                write!(f, "cannot resolve resource type `{name}`")
            }
            Self::MalformedId { resource_type, id } => write!(
                f,
                "malformed id `{id}` for {resource_type}; expected 1-64 of [A-Za-z0-9-.]"
            ),
        }
    }
}

impl Error for KeyError {}

/// The `(resource_type, id)` pair identifying exactly one stored resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    resource_type: String,
    id: String,
}

impl ResourceKey {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let resource_type = resource_type.into();
        let id = id.into();

        if !is_known_resource_type(&resource_type) {
            return Err(KeyError::UnknownType(resource_type));
        }
        if !ID_RE.is_match(&id) {
            return Err(KeyError::MalformedId { resource_type, id });
        }

        Ok(Self { resource_type, id })
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::{is_known_resource_type, KeyError, ResourceKey, R4_RESOURCE_TYPES};

    #[test]
    fn registry_is_sorted_for_binary_search() {
        let mut sorted = R4_RESOURCE_TYPES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, R4_RESOURCE_TYPES);
    }

    #[test]
    fn known_types_resolve() {
        assert!(is_known_resource_type("Patient"));
        assert!(is_known_resource_type("Observation"));
        assert!(!is_known_resource_type("patient"));
        assert!(!is_known_resource_type(""));
    }

    #[test]
    fn key_accepts_uuid_and_dotted_ids() {
        let key = ResourceKey::new("Patient", "3f1c6f4e-1b7a-4a2e-9d55-1f0f3e2f6a10").unwrap();
        assert_eq!(key.resource_type(), "Patient");
        assert_eq!(key.to_string(), "Patient/3f1c6f4e-1b7a-4a2e-9d55-1f0f3e2f6a10");
        ResourceKey::new("Observation", "bp.2024.01").unwrap();
    }

    #[test]
    fn key_rejects_unknown_type() {
        let err = ResourceKey::new("Spaceship", "1").unwrap_err();
        assert_eq!(err, KeyError::UnknownType("Spaceship".to_string()));
    }

    #[test]
    fn key_rejects_malformed_ids() {
        for id in ["", "has space", "slash/inside", "x".repeat(65).as_str()] {
            let err = ResourceKey::new("Patient", id).unwrap_err();
            assert!(matches!(err, KeyError::MalformedId { .. }), "id `{id}` accepted");
        }
    }
}
