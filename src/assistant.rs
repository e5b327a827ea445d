//! Care assistant: gathers a child's records, renders the prompt and hands
//! it to a language model.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::intelligence::RiskEvaluator;
use crate::llm::{LlmError, LlmGenerate};
use crate::prompt::{GraphData, PromptAssembler, PromptError};
use crate::store::{RecordStore, StoreError};

/// Upcoming appointments shown in the prompt.
pub const UPCOMING_APPOINTMENT_LIMIT: usize = 5;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),
}

/// One parent question about one child.
#[derive(Debug, Clone, Copy)]
pub struct CareRequest<'a> {
    pub child_id: &'a str,
    pub question: &'a str,
    /// Long-lived profile summary from conversation memory.
    pub profile: Option<&'a str>,
    /// Recent conversation summary.
    pub context: Option<&'a str>,
    /// Medication the parent is asking about, checked for safety.
    pub medication: Option<&'a str>,
}

impl<'a> CareRequest<'a> {
    pub fn new(child_id: &'a str, question: &'a str) -> Self {
        Self {
            child_id,
            question,
            profile: None,
            context: None,
            medication: None,
        }
    }

    pub fn with_profile(mut self, profile: Option<&'a str>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_context(mut self, context: Option<&'a str>) -> Self {
        self.context = context;
        self
    }

    pub fn with_medication(mut self, medication: Option<&'a str>) -> Self {
        self.medication = medication;
        self
    }
}

pub struct CareAssistant<S: RecordStore> {
    store: S,
    assembler: PromptAssembler,
}

impl<S: RecordStore> CareAssistant<S> {
    pub fn new(store: S, assembler: PromptAssembler) -> Self {
        Self { store, assembler }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn evaluator(&self) -> RiskEvaluator<'_, S> {
        RiskEvaluator::new(&self.store)
    }

    pub fn gather_graph_data(
        &self,
        child_id: &str,
        medication: Option<&str>,
    ) -> Result<GraphData, StoreError> {
        self.gather_graph_data_at(child_id, medication, Utc::now())
    }

    /// Everything the prompt shows about the child, as of `now`.
    pub fn gather_graph_data_at(
        &self,
        child_id: &str,
        medication: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<GraphData, StoreError> {
        let evaluator = self.evaluator();

        let child = self.store.get_child(child_id)?;
        let medications = self.store.active_medications(child_id)?;
        let emergency = evaluator.check_emergency_status_at(child_id, now)?;
        let appointments = self.store.upcoming_appointments(
            child_id,
            now.date_naive(),
            UPCOMING_APPOINTMENT_LIMIT,
        )?;
        let medication_safety = match medication.map(str::trim).filter(|m| !m.is_empty()) {
            Some(med) => Some(evaluator.check_medication_safety(child_id, med)?),
            None => None,
        };

        tracing::debug!(
            child_id = %child_id,
            found = child.is_some(),
            medications = medications.len(),
            symptoms = emergency.recent_symptoms.len(),
            appointments = appointments.len(),
            "Gathered graph data"
        );

        Ok(GraphData {
            child,
            medications,
            symptoms: emergency.recent_symptoms.clone(),
            emergency_status: Some(emergency),
            appointments,
            medication_safety,
        })
    }

    pub fn build_prompt(&self, request: &CareRequest<'_>) -> Result<String, AssistantError> {
        self.build_prompt_at(request, Utc::now())
    }

    /// Gather and render. An empty question fails before any store read.
    pub fn build_prompt_at(
        &self,
        request: &CareRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<String, AssistantError> {
        if request.question.trim().is_empty() {
            return Err(PromptError::EmptyQuery.into());
        }
        let graph = self.gather_graph_data_at(request.child_id, request.medication, now)?;
        Ok(self.assembler.create_query_at(
            request.profile,
            request.context,
            request.question,
            Some(&graph),
            now,
        )?)
    }

    /// Answer the question through `llm`.
    pub fn ask<L: LlmGenerate + ?Sized>(
        &self,
        llm: &L,
        request: &CareRequest<'_>,
    ) -> Result<String, AssistantError> {
        let prompt = self.build_prompt(request)?;
        tracing::info!(child_id = %request.child_id, prompt_len = prompt.len(), "Asking language model");
        Ok(llm.generate(&prompt)?)
    }
}
