use serde::{Deserialize, Serialize};

use crate::intelligence::{EmergencyVerdict, SafetyVerdict};
use crate::models::{ActiveMedication, Appointment, Child, SymptomSummary};

pub const NO_GRAPH_DATA: &str = "No graph data available.";

/// Structured record data for one child, as rendered into the prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    pub child: Option<Child>,
    pub medications: Vec<ActiveMedication>,
    pub symptoms: Vec<SymptomSummary>,
    pub emergency_status: Option<EmergencyVerdict>,
    pub appointments: Vec<Appointment>,
    pub medication_safety: Option<SafetyVerdict>,
}

impl GraphData {
    /// Render the sections in fixed order: child, medications, symptoms,
    /// emergency, appointments, safety alert. Sections without data are
    /// left out; each rendered section ends with a blank line.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        if let Some(child) = &self.child {
            lines.push("👶 CHILD INFORMATION:".into());
            lines.push(format!("- Name: {}", child.name));
            lines.push(format!("- Age: {} years old", child.age));
            lines.push(format!("- Weight: {} kg", child.weight_kg));
            if !child.allergies.is_empty() {
                lines.push(format!("- ⚠️ ALLERGIES: {}", child.allergies.join(", ")));
            }
            lines.push(String::new());
        }

        if !self.medications.is_empty() {
            lines.push("💊 CURRENT MEDICATIONS:".into());
            for med in &self.medications {
                lines.push(format!("- {}: {} - {}", med.medication, med.dosage, med.frequency));
            }
            lines.push(String::new());
        }

        if !self.symptoms.is_empty() {
            lines.push("🩺 RECENT SYMPTOMS (last 24h):".into());
            for symptom in &self.symptoms {
                lines.push(format!("- {}: Severity {}/10", symptom.name, symptom.severity));
            }
            lines.push(String::new());
        }

        if let Some(emergency) = self.emergency_status.as_ref().filter(|e| e.is_emergency) {
            lines.push("🚨 EMERGENCY STATUS: CRITICAL SYMPTOMS DETECTED".into());
            for symptom in &emergency.critical_symptoms {
                lines.push(format!("   - {} (severity: {})", symptom.name, symptom.severity));
            }
            lines.push(String::new());
        }

        if !self.appointments.is_empty() {
            lines.push("📅 UPCOMING APPOINTMENTS:".into());
            for appt in &self.appointments {
                lines.push(format!(
                    "- {} at {}: {} with Dr. {}",
                    appt.date, appt.time, appt.appointment_type, appt.doctor
                ));
            }
            lines.push(String::new());
        }

        if let Some(safety) = self.medication_safety.as_ref().filter(|s| !s.safe) {
            lines.push("⚠️ MEDICATION SAFETY ALERT:".into());
            if safety.has_allergy {
                lines.push(format!("   - ALLERGY RISK: {}", safety.allergies.join(", ")));
            }
            if !safety.interactions.is_empty() {
                lines.push("   - DRUG INTERACTIONS:".into());
                for interaction in &safety.interactions {
                    lines.push(format!(
                        "      * {}: {} (Severity: {})",
                        interaction.current_med, interaction.description, interaction.severity
                    ));
                }
            }
            lines.push(String::new());
        }

        if lines.is_empty() {
            NO_GRAPH_DATA.to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Render optional graph data; `None` renders the "no data" line.
pub fn format_graph_data(data: Option<&GraphData>) -> String {
    data.map(GraphData::render)
        .unwrap_or_else(|| NO_GRAPH_DATA.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::models::enums::{AppointmentStatus, InteractionSeverity};
    use crate::models::InteractionMatch;

    fn emma() -> Child {
        Child::new("emma", "Emma", 5, 18.5).with_allergies(["penicillin"])
    }

    fn ibuprofen() -> ActiveMedication {
        ActiveMedication {
            medication: "Ibuprofen".into(),
            dosage: "100mg".into(),
            frequency: "as needed".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        }
    }

    fn checkup() -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            child_id: "emma".into(),
            appointment_type: "Checkup".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
            time: "10:00 AM".into(),
            doctor: "Smith".into(),
            location: "Main Street Clinic".into(),
            notes: None,
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
        }
    }

    fn symptom(name: &str, severity: u8) -> SymptomSummary {
        SymptomSummary {
            name: name.into(),
            severity,
        }
    }

    #[test]
    fn empty_data_renders_placeholder() {
        assert_eq!(format_graph_data(None), NO_GRAPH_DATA);
        assert_eq!(GraphData::default().render(), NO_GRAPH_DATA);
    }

    #[test]
    fn calm_verdicts_alone_render_placeholder() {
        let data = GraphData {
            emergency_status: Some(EmergencyVerdict::default()),
            medication_safety: Some(SafetyVerdict::clear()),
            ..Default::default()
        };
        assert_eq!(data.render(), NO_GRAPH_DATA);
    }

    #[test]
    fn child_section_layout() {
        let data = GraphData {
            child: Some(emma()),
            ..Default::default()
        };
        assert_eq!(
            data.render(),
            "👶 CHILD INFORMATION:\n- Name: Emma\n- Age: 5 years old\n- Weight: 18.5 kg\n- ⚠️ ALLERGIES: penicillin\n"
        );
    }

    #[test]
    fn sections_in_fixed_order() {
        let data = GraphData {
            child: Some(emma()),
            medications: vec![ibuprofen()],
            symptoms: vec![symptom("breathing_difficulty", 9)],
            emergency_status: Some(EmergencyVerdict {
                is_emergency: true,
                critical_symptoms: vec![symptom("breathing_difficulty", 9)],
                recent_symptoms: vec![symptom("breathing_difficulty", 9)],
            }),
            appointments: vec![checkup()],
            medication_safety: Some(SafetyVerdict {
                safe: false,
                has_allergy: true,
                allergies: vec!["penicillin".into()],
                interactions: vec![InteractionMatch {
                    current_med: "Ibuprofen".into(),
                    severity: InteractionSeverity::Moderate,
                    description: "Increased bleeding risk".into(),
                }],
            }),
        };
        let text = data.render();

        let order = [
            "👶 CHILD INFORMATION:",
            "💊 CURRENT MEDICATIONS:",
            "🩺 RECENT SYMPTOMS (last 24h):",
            "🚨 EMERGENCY STATUS: CRITICAL SYMPTOMS DETECTED",
            "📅 UPCOMING APPOINTMENTS:",
            "⚠️ MEDICATION SAFETY ALERT:",
        ];
        let positions: Vec<usize> = order.iter().map(|h| text.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(text.contains("- Ibuprofen: 100mg - as needed"));
        assert!(text.contains("- breathing_difficulty: Severity 9/10"));
        assert!(text.contains("   - breathing_difficulty (severity: 9)"));
        assert!(text.contains("- 2026-03-20 at 10:00 AM: Checkup with Dr. Smith"));
        assert!(text.contains("   - ALLERGY RISK: penicillin"));
        assert!(text.contains("      * Ibuprofen: Increased bleeding risk (Severity: moderate)"));
    }

    #[test]
    fn non_emergency_omits_emergency_section() {
        let data = GraphData {
            symptoms: vec![symptom("fever_c", 7)],
            emergency_status: Some(EmergencyVerdict {
                is_emergency: false,
                critical_symptoms: vec![],
                recent_symptoms: vec![symptom("fever_c", 7)],
            }),
            ..Default::default()
        };
        let text = data.render();
        assert!(text.contains("- fever_c: Severity 7/10"));
        assert!(!text.contains("EMERGENCY STATUS"));
    }
}
