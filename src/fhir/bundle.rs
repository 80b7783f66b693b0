//! FHIR R4 bundle conversion
//!
//! Resources are handled as `serde_json::Value` since only a handful of
//! MedicationRequest fields matter here.

use serde_json::{json, Value};
use std::collections::HashSet;

use crate::schedule::{format_dosage, DosageForm, Frequency, Medication, MedicationDraft};

const RXNORM_SYSTEM: &str = "http://www.nlm.nih.gov/research/umls/rxnorm";

/// Iterate the MedicationRequest resources in a bundle
fn medication_requests(bundle: &Value) -> impl Iterator<Item = &Value> {
    bundle
        .get("entry")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("resource"))
        .filter(|r| r.get("resourceType").and_then(Value::as_str) == Some("MedicationRequest"))
}

/// Distinct `medicationCodeableConcept.text` values, in bundle order
pub fn medication_names(bundle: &Value) -> Vec<String> {
    let mut seen = HashSet::new();
    medication_requests(bundle)
        .filter_map(|r| r.pointer("/medicationCodeableConcept/text"))
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_string)
        .collect()
}

/// Sentence form of a medication's instructions
fn instruction_text(med: &Medication) -> String {
    let mut text = format!(
        "Take {} ({})",
        med.form.as_str(),
        format_dosage(med)
    );

    text.push(' ');
    text.push_str(&med.frequency.label().to_lowercase());

    if !med.reason.trim().is_empty() {
        text.push_str(" for ");
        text.push_str(&med.reason.to_lowercase());
    }

    if !med.times.is_empty() {
        let times: Vec<String> = med.times.iter().map(|t| t.to_string()).collect();
        text.push_str(" at ");
        text.push_str(&times.join(" and "));
    }
    text
}

/// FHIR `timing.repeat` for a medication
fn timing_repeat(med: &Medication) -> Value {
    let mut bounds = json!({ "start": med.start_date.to_string() });
    if let Some(end) = med.effective_end() {
        bounds["end"] = json!(end.to_string());
    }

    let mut repeat = json!({ "boundsPeriod": bounds });
    match med.frequency {
        Frequency::AsNeeded => {}
        Frequency::Weekly => {
            repeat["frequency"] = json!(1);
            repeat["period"] = json!(1);
            repeat["periodUnit"] = json!("wk");
        }
        daily => {
            repeat["frequency"] = json!(daily.slots());
            repeat["period"] = json!(1);
            repeat["periodUnit"] = json!("d");
        }
    }

    if !med.times.is_empty() {
        let times: Vec<String> = med.times.iter().map(|t| t.to_24h()).collect();
        repeat["timeOfDay"] = json!(times);
    }
    if !med.days.is_empty() {
        let days: Vec<String> = med.days.iter().map(|d| d.to_string().to_lowercase()).collect();
        repeat["dayOfWeek"] = json!(days);
    }
    repeat
}

/// Resource id used for a medication on the FHIR server
pub fn resource_id(med: &Medication) -> String {
    format!("med{}", med.id)
}

/// Build a MedicationRequest resource for `med`
pub fn medication_request(med: &Medication, patient_id: &str) -> Value {
    let mut dosage = json!({
        "text": instruction_text(med),
        "timing": { "repeat": timing_repeat(med) },
        "doseAndRate": [{
            "doseQuantity": { "value": med.dosage_amount, "unit": med.dosage_unit }
        }],
    });

    if let Some(notes) = &med.notes {
        dosage["additionalInstruction"] = json!([{ "text": notes }]);
    }
    if med.frequency == Frequency::AsNeeded {
        dosage["asNeededBoolean"] = json!(true);
    }

    let mut resource = json!({
        "resourceType": "MedicationRequest",
        "id": resource_id(med),
        "status": "active",
        "intent": "order",
        "medicationCodeableConcept": {
            "text": med.name,
            "coding": [{
                "system": RXNORM_SYSTEM,
                "display": format!("{} {} {}", med.name, format_dosage(med), capitalize(med.form.as_str())),
            }],
        },
        "subject": { "reference": format!("Patient/{}", patient_id) },
        "authoredOn": med.start_date.to_string(),
        "dosageInstruction": [dosage],
    });

    if !med.reason.trim().is_empty() {
        resource["reasonCode"] = json!([{ "text": med.reason }]);
    }
    resource
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The shared demo patient
pub fn patient_resource(patient_id: &str) -> Value {
    json!({
        "resourceType": "Patient",
        "id": patient_id,
        "name": [{
            "use": "official",
            "family": "SharedPatient",
            "given": ["Group55"],
        }],
        "gender": "female",
        "birthDate": "1990-01-01",
    })
}

/// Transaction bundle that resets a patient's medication list on the server
///
/// Deletes every existing MedicationRequest for the patient, upserts the
/// Patient, then PUTs one MedicationRequest per medication.
pub fn demo_bundle(patient_id: &str, meds: &[Medication]) -> Value {
    let mut entries = vec![
        json!({
            "request": {
                "method": "DELETE",
                "url": format!("MedicationRequest?patient={}", urlencoding::encode(patient_id)),
            }
        }),
        json!({
            "resource": patient_resource(patient_id),
            "request": { "method": "PUT", "url": format!("Patient/{}", patient_id) },
        }),
    ];

    entries.extend(meds.iter().map(|med| {
        json!({
            "resource": medication_request(med, patient_id),
            "request": {
                "method": "PUT",
                "url": format!("MedicationRequest/{}", resource_id(med)),
            },
        })
    }));

    json!({
        "resourceType": "Bundle",
        "type": "transaction",
        "entry": entries,
    })
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Map `timing.repeat` back to a frequency
fn frequency_from_repeat(repeat: Option<&Value>, as_needed: bool, time_count: usize) -> Frequency {
    if as_needed {
        return Frequency::AsNeeded;
    }

    let unit = repeat
        .and_then(|r| r.get("periodUnit"))
        .and_then(Value::as_str);
    if unit == Some("wk") {
        return Frequency::Weekly;
    }

    let count = repeat
        .and_then(|r| r.get("frequency"))
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(time_count);

    match count {
        2 => Frequency::TwiceDaily,
        3 => Frequency::ThreeTimesDaily,
        n if n >= 4 => Frequency::FourTimesDaily,
        _ => Frequency::OnceDaily,
    }
}

fn draft_from_request(resource: &Value) -> Option<MedicationDraft> {
    let name = str_at(resource, "/medicationCodeableConcept/text")
        .or_else(|| str_at(resource, "/medicationCodeableConcept/coding/0/display"))?;

    let dosage = resource.pointer("/dosageInstruction/0");
    let repeat = dosage.and_then(|d| d.pointer("/timing/repeat"));
    let as_needed = dosage
        .and_then(|d| d.get("asNeededBoolean"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let times: Vec<String> = repeat
        .and_then(|r| r.get("timeOfDay"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(|t| t.get(..5).unwrap_or(t).to_string())
        .collect();

    let days: Vec<String> = repeat
        .and_then(|r| r.get("dayOfWeek"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();

    let quantity = dosage.and_then(|d| d.pointer("/doseAndRate/0/doseQuantity"));
    let start = repeat
        .and_then(|r| str_at(r, "/boundsPeriod/start"))
        .or_else(|| str_at(resource, "/authoredOn"));
    let end = repeat.and_then(|r| str_at(r, "/boundsPeriod/end"));

    Some(MedicationDraft {
        name: name.to_string(),
        dosage_amount: quantity.and_then(|q| q.get("value")).and_then(Value::as_f64),
        dosage_unit: quantity
            .and_then(|q| str_at(q, "/unit"))
            .unwrap_or("mg")
            .to_string(),
        form: Some(DosageForm::Tablet),
        reason: str_at(resource, "/reasonCode/0/text").map(str::to_string),
        frequency: Some(frequency_from_repeat(repeat, as_needed, times.len())),
        no_end_date: end.is_none(),
        start_date: start.map(|s| s.get(..10).unwrap_or(s).to_string()),
        end_date: end.map(|s| s.get(..10).unwrap_or(s).to_string()),
        notes: dosage
            .and_then(|d| str_at(d, "/additionalInstruction/0/text"))
            .map(str::to_string),
        times,
        days,
        refill_date: None,
    })
}

/// Medication drafts for each MedicationRequest in a bundle
///
/// Requests without a medication name are skipped; other gaps are left for
/// draft validation to report.
pub fn medications_from_bundle(bundle: &Value) -> Vec<MedicationDraft> {
    medication_requests(bundle)
        .filter_map(draft_from_request)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::demo_drafts;

    fn demo_meds() -> Vec<Medication> {
        demo_drafts()
            .into_iter()
            .enumerate()
            .map(|(i, d)| d.validate(i as u64 + 1).unwrap())
            .collect()
    }

    #[test]
    fn test_demo_bundle_shape() {
        let bundle = demo_bundle("group55-sharedpatient", &demo_meds());
        let entries = bundle["entry"].as_array().unwrap();

        assert_eq!(bundle["type"], "transaction");
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0]["request"]["method"], "DELETE");
        assert_eq!(
            entries[0]["request"]["url"],
            "MedicationRequest?patient=group55-sharedpatient"
        );
        assert_eq!(entries[1]["request"]["url"], "Patient/group55-sharedpatient");
        assert_eq!(entries[2]["request"]["url"], "MedicationRequest/med1");
    }

    #[test]
    fn test_medication_request_fields() {
        let meds = demo_meds();
        let tylenol = medication_request(&meds[0], "p1");

        assert_eq!(tylenol["subject"]["reference"], "Patient/p1");
        let dosage = &tylenol["dosageInstruction"][0];
        assert_eq!(
            dosage["timing"]["repeat"]["timeOfDay"],
            json!(["08:00", "20:00"])
        );
        assert_eq!(dosage["timing"]["repeat"]["frequency"], 2);
        assert_eq!(dosage["doseAndRate"][0]["doseQuantity"]["value"], 650.0);
        assert_eq!(
            dosage["text"],
            "Take tablet (650 mg) twice daily for back pain at 8:00 AM and 8:00 PM"
        );

        let advil = medication_request(&meds[2], "p1");
        assert_eq!(advil["dosageInstruction"][0]["asNeededBoolean"], true);
        assert!(advil["dosageInstruction"][0]["timing"]["repeat"]["boundsPeriod"]
            .get("end")
            .is_none());
    }

    #[test]
    fn test_medication_names() {
        let meds = demo_meds();
        let mut bundle = demo_bundle("p1", &meds);
        bundle["entry"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "resource": medication_request(&meds[0], "p1") }));

        assert_eq!(medication_names(&bundle), vec!["Tylenol", "Zyrtec", "Advil"]);
        assert!(medication_names(&json!({})).is_empty());
    }

    #[test]
    fn test_bundle_converts_back_to_drafts() {
        let meds = demo_meds();
        let drafts = medications_from_bundle(&demo_bundle("p1", &meds));
        assert_eq!(drafts.len(), 3);

        let restored: Vec<Medication> = drafts
            .into_iter()
            .zip(&meds)
            .map(|(d, m)| d.validate(m.id).unwrap())
            .collect();

        assert_eq!(restored[0].times, meds[0].times);
        assert_eq!(restored[0].frequency, Frequency::TwiceDaily);
        assert_eq!(restored[1].end_date, meds[1].end_date);
        assert_eq!(restored[2].frequency, Frequency::AsNeeded);
        assert!(restored[2].no_end_date);
        assert_eq!(restored[2].notes.as_deref(), Some("Take at first sign of migraine."));
    }

    #[test]
    fn test_draft_from_hapi_resource() {
        let resource = json!({
            "resourceType": "MedicationRequest",
            "medicationCodeableConcept": { "text": "Zyrtec" },
            "authoredOn": "2025-04-14",
            "dosageInstruction": [{
                "timing": { "repeat": { "frequency": 1, "period": 1, "periodUnit": "d", "timeOfDay": ["08:00:00"] } },
                "doseAndRate": [{ "doseQuantity": { "value": 10, "unit": "mg" } }]
            }],
            "reasonCode": [{ "text": "Allergies" }]
        });

        let draft = draft_from_request(&resource).unwrap();
        assert_eq!(draft.times, vec!["08:00"]);
        assert_eq!(draft.start_date.as_deref(), Some("2025-04-14"));
        assert_eq!(draft.dosage_amount, Some(10.0));
        assert!(draft.no_end_date);
        assert_eq!(draft.reason.as_deref(), Some("Allergies"));
        assert!(draft.days.is_empty());
    }

    #[test]
    fn test_day_of_week_round_trip() {
        let med = MedicationDraft::new("Prednisone", 5.0, "mg", "2025-01-06")
            .time("08:00")
            .day("mon")
            .day("wed")
            .day("fri")
            .validate(11)
            .unwrap();

        let request = medication_request(&med, "p1");
        let repeat = &request["dosageInstruction"][0]["timing"]["repeat"];
        assert_eq!(repeat["dayOfWeek"], json!(["mon", "wed", "fri"]));

        let restored = draft_from_request(&request).unwrap().validate(med.id).unwrap();
        assert_eq!(restored.days, med.days);
    }
}
