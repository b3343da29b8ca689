use crate::{
    session::{
        error::{SessionError, TransmissionCause, TransmissionFailure, state_violation},
        locator::{ResultLocators, decompose},
        ports::{AssessmentEnginePort, ItemSessionView},
        transmitter::ResultTransmitter,
        types::{ItemOccurrence, TransmissionId},
    },
    variables::{Variable, VariableId, VariableSet},
};

/// Outcome of one successfully recorded attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    pub item: ItemOccurrence,
    pub transmission_id: TransmissionId,
    pub delivered: Vec<VariableId>,
}

/// Ends the current attempt on an engine and forwards the resulting item
/// variables to the result transmitter.
#[derive(Clone)]
pub struct ItemAttemptController {
    transmitter: ResultTransmitter,
}

impl ItemAttemptController {
    pub fn new(transmitter: ResultTransmitter) -> Self {
        Self { transmitter }
    }

    pub fn end_attempt(
        &self,
        engine: &mut dyn AssessmentEnginePort,
        responses: VariableSet,
    ) -> Result<AttemptReport, SessionError> {
        // Linear navigation moves "current" inside the engine call, so the
        // completed item has to be captured first.
        let (item, href) = match (engine.current_item_ref(), engine.current_occurrence()) {
            (Some(item_ref), Some(occurrence)) => (
                ItemOccurrence::new(item_ref.identifier.clone(), occurrence),
                item_ref.href.clone(),
            ),
            _ => {
                let source =
                    state_violation(format!("no current item while session is {}", engine.state()));
                tracing::warn!(
                    target: "session.attempt",
                    session_id = %engine.session_id(),
                    state = %engine.state(),
                    "attempt_rejected_without_current_item"
                );
                return Err(SessionError::AttemptCompletion { item: None, source });
            }
        };

        tracing::debug!(
            target: "session.attempt",
            session_id = %engine.session_id(),
            item = %item,
            responses = responses.len(),
            "attempt_ending"
        );

        let locators = decompose(&href).map_err(|source| SessionError::MalformedLocator {
            item: item.clone(),
            source,
        })?;
        let transmission_id = TransmissionId::new(engine.session_id(), &item);

        if let Err(source) = engine.end_attempt(responses) {
            tracing::warn!(
                target: "session.attempt",
                session_id = %engine.session_id(),
                item = %item,
                error_kind = ?source.kind,
                error = %source,
                "attempt_completion_failed"
            );
            return Err(SessionError::AttemptCompletion {
                item: Some(item),
                source,
            });
        }

        let delivered = self
            .transmit_item_session(&*engine, &item, &transmission_id, &locators, &[])
            .map_err(|failure| transmission_error(&item, failure))?;

        tracing::info!(
            target: "session.attempt",
            transmission_id = %transmission_id,
            delivered = delivered.len(),
            state_after = %engine.state(),
            "attempt_completed"
        );

        Ok(AttemptReport {
            item,
            transmission_id,
            delivered,
        })
    }

    /// Sends what a previous transmission left undelivered, using the values
    /// captured when that attempt ended. Only when the item session could not
    /// be read at all is it read again here.
    pub fn retransmit(
        &self,
        engine: &dyn AssessmentEnginePort,
        item: &ItemOccurrence,
        previous: &TransmissionFailure,
    ) -> Result<AttemptReport, SessionError> {
        tracing::info!(
            target: "session.attempt",
            transmission_id = %previous.transmission_id,
            already_delivered = previous.delivered.len(),
            unsent = previous.unsent.len(),
            "result_retransmission_started"
        );

        let sent = if previous.is_unread() {
            self.transmit_item_session(
                engine,
                item,
                &previous.transmission_id,
                &previous.locators,
                &previous.delivered,
            )
        } else {
            self.transmit_variables(
                previous.unsent.clone(),
                &previous.transmission_id,
                &previous.locators,
            )
        };

        let mut delivered = previous.delivered.clone();
        match sent {
            Ok(sent) => {
                delivered.extend(sent);
                Ok(AttemptReport {
                    item: item.clone(),
                    transmission_id: previous.transmission_id.clone(),
                    delivered,
                })
            }
            Err(mut failure) => {
                delivered.append(&mut failure.delivered);
                failure.delivered = delivered;
                Err(transmission_error(item, failure))
            }
        }
    }

    /// Snapshots the item session's variables, minus those in `skip`, and
    /// transmits them in insertion order.
    fn transmit_item_session(
        &self,
        engine: &dyn AssessmentEnginePort,
        item: &ItemOccurrence,
        transmission_id: &TransmissionId,
        locators: &ResultLocators,
        skip: &[VariableId],
    ) -> Result<Vec<VariableId>, TransmissionFailure> {
        let session = engine
            .item_session(&item.item_ref, item.occurrence)
            .map_err(|err| TransmissionFailure {
                transmission_id: transmission_id.clone(),
                locators: locators.clone(),
                delivered: Vec::new(),
                failed: None,
                pending: Vec::new(),
                unsent: Vec::new(),
                cause: TransmissionCause::Engine(err),
            })?;

        let variables: Vec<Variable> = session
            .variables()
            .iter()
            .filter(|variable| !skip.contains(&variable.identifier))
            .cloned()
            .collect();

        self.transmit_variables(variables, transmission_id, locators)
    }

    fn transmit_variables(
        &self,
        variables: Vec<Variable>,
        transmission_id: &TransmissionId,
        locators: &ResultLocators,
    ) -> Result<Vec<VariableId>, TransmissionFailure> {
        let mut delivered = Vec::with_capacity(variables.len());
        for (index, variable) in variables.iter().enumerate() {
            if let Err(err) = self.transmitter.transmit(
                variable,
                transmission_id,
                &locators.item_definition,
                &locators.test_definition,
            ) {
                return Err(TransmissionFailure {
                    transmission_id: transmission_id.clone(),
                    locators: locators.clone(),
                    delivered,
                    failed: Some(variable.identifier.clone()),
                    pending: variables[index + 1..]
                        .iter()
                        .map(|pending| pending.identifier.clone())
                        .collect(),
                    unsent: variables[index..].to_vec(),
                    cause: TransmissionCause::Sink(err),
                });
            }
            delivered.push(variable.identifier.clone());
        }

        Ok(delivered)
    }
}

fn transmission_error(item: &ItemOccurrence, failure: TransmissionFailure) -> SessionError {
    tracing::error!(
        target: "session.attempt",
        transmission_id = %failure.transmission_id,
        delivered = ?failure.delivered,
        failed = ?failure.failed,
        pending = ?failure.pending,
        error = %failure,
        "result_transmission_failed"
    );
    SessionError::ResultTransmission {
        item: item.clone(),
        failure,
    }
}
