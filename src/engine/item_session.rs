use crate::{
    engine::route::RouteStep,
    session::{
        error::{EngineError, invalid_response},
        ports::ItemSessionView,
        types::{ItemRef, Occurrence},
    },
    variables::{BaseType, Cardinality, Scalar, Value, Variable, VariableSet},
};

pub const NUM_ATTEMPTS: &str = "numAttempts";
pub const COMPLETION_STATUS: &str = "completionStatus";
pub const SCORE: &str = "SCORE";

const STATUS_NOT_ATTEMPTED: &str = "not_attempted";
const STATUS_COMPLETED: &str = "completed";

/// Variables of one route step: built-ins first, then declared responses,
/// then declared outcomes.
#[derive(Debug, Clone)]
pub struct ItemSession {
    item_ref: ItemRef,
    occurrence: Occurrence,
    num_attempts: i64,
    variables: VariableSet,
}

impl ItemSession {
    pub fn new(step: &RouteStep) -> Self {
        let mut variables = VariableSet::new();
        variables.insert(num_attempts_variable(0));
        variables.insert(completion_status_variable(STATUS_NOT_ATTEMPTED));
        for declaration in &step.item_ref.response_declarations {
            variables.insert(Variable::response(
                declaration.identifier.clone(),
                declaration.cardinality,
                declaration.base_type,
                Value::Null,
            ));
        }
        for declaration in &step.item_ref.outcome_declarations {
            variables.insert(Variable::outcome(
                declaration.identifier.clone(),
                declaration.cardinality,
                declaration.base_type,
                declaration.default_value.clone(),
            ));
        }

        Self {
            item_ref: step.item_ref.clone(),
            occurrence: step.occurrence,
            num_attempts: 0,
            variables,
        }
    }

    pub fn num_attempts(&self) -> i64 {
        self.num_attempts
    }

    /// Validates every response before touching state, so a rejected
    /// attempt leaves the item session unchanged.
    pub fn end_attempt(&mut self, responses: VariableSet) -> Result<(), EngineError> {
        for response in responses.iter() {
            let declaration = self
                .item_ref
                .response_declaration(&response.identifier)
                .ok_or_else(|| {
                    invalid_response(format!(
                        "response '{}' is not declared by item '{}'",
                        response.identifier, self.item_ref.identifier
                    ))
                })?;
            if !response
                .value
                .conforms_to(declaration.cardinality, declaration.base_type)
            {
                return Err(invalid_response(format!(
                    "response '{}' does not match its declaration ({:?}, {})",
                    response.identifier,
                    declaration.cardinality,
                    declaration
                        .base_type
                        .map(|base_type| base_type.to_string())
                        .unwrap_or_else(|| "no base type".to_string())
                )));
            }
        }

        self.num_attempts += 1;
        self.variables.insert(num_attempts_variable(self.num_attempts));
        for response in responses {
            let declaration = self.item_ref.response_declaration(&response.identifier);
            self.variables.insert(Variable::response(
                response.identifier,
                declaration.map_or(response.cardinality, |d| d.cardinality),
                declaration.map_or(response.base_type, |d| d.base_type),
                response.value,
            ));
        }
        self.variables
            .insert(completion_status_variable(STATUS_COMPLETED));
        self.process_responses();
        Ok(())
    }

    /// Match-correct processing: SCORE counts responses equal to their
    /// correct response. Items without a declared SCORE or without any
    /// correct response are left to their outcome defaults.
    fn process_responses(&mut self) {
        let Some(score) = self.variables.get(SCORE) else {
            return;
        };
        let (cardinality, base_type) = (score.cardinality, score.base_type);

        let keyed: Vec<_> = self
            .item_ref
            .response_declarations
            .iter()
            .filter_map(|declaration| {
                declaration
                    .correct_response
                    .as_ref()
                    .map(|correct| (declaration.identifier.as_str(), correct))
            })
            .collect();
        if keyed.is_empty() {
            return;
        }

        let matched = keyed
            .iter()
            .filter(|(identifier, correct)| {
                self.variables
                    .get(identifier)
                    .is_some_and(|response| response.value.equivalent(correct))
            })
            .count();

        let value = match base_type {
            Some(BaseType::Integer) => Scalar::Integer(matched as i64),
            _ => Scalar::Float(matched as f64),
        };
        self.variables.insert(Variable::outcome(
            SCORE,
            cardinality,
            base_type,
            Value::Single(value),
        ));
    }
}

impl ItemSessionView for ItemSession {
    fn item_ref(&self) -> &ItemRef {
        &self.item_ref
    }

    fn occurrence(&self) -> Occurrence {
        self.occurrence
    }

    fn variables(&self) -> &VariableSet {
        &self.variables
    }
}

fn num_attempts_variable(count: i64) -> Variable {
    Variable::response(
        NUM_ATTEMPTS,
        Cardinality::Single,
        Some(BaseType::Integer),
        Value::Single(Scalar::Integer(count)),
    )
}

fn completion_status_variable(status: &str) -> Variable {
    Variable::outcome(
        COMPLETION_STATUS,
        Cardinality::Single,
        Some(BaseType::Identifier),
        Value::Single(Scalar::Identifier(status.to_string())),
    )
}
