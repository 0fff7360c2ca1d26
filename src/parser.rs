use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::deserialize::{self, DeserializeContext, DeserializedParameters};
use crate::error::ParamsError;
use crate::host::{FaultObjectFactory, FeatureAccess, HostTypes, OutdateClassifier};
use crate::migration::ConverterRegistry;
use crate::model::feature::{OutdateState, RawParameters, SerializedParameters};
use crate::schema::{FeatureParameters, ParameterSchema};
use crate::serialize;

type SharedFaultFactory<H> = Arc<dyn FaultObjectFactory<H> + Send + Sync>;
type SharedClassifier<H> = Arc<dyn OutdateClassifier<H> + Send + Sync>;

/// Converts custom feature parameters between their typed form and the data
/// persisted on a feature.
///
/// Cloning is cheap; clones share the schema cache and the converter
/// registries, which are fixed once the parser is built.
pub struct ParametersParser<H: HostTypes> {
    inner: Arc<ParserInner<H>>,
}

struct ParserInner<H: HostTypes> {
    fault_factory: SharedFaultFactory<H>,
    classifier: SharedClassifier<H>,
    registries: HashMap<TypeId, Arc<ConverterRegistry<H>>>,
    schemas: RwLock<HashMap<TypeId, Arc<ParameterSchema>>>,
}

pub struct ParserBuilder<H: HostTypes> {
    fault_factory: Option<SharedFaultFactory<H>>,
    classifier: Option<SharedClassifier<H>>,
    registries: HashMap<TypeId, Arc<ConverterRegistry<H>>>,
    problems: Vec<String>,
}

impl<H: HostTypes> ParserBuilder<H> {
    pub fn new() -> Self {
        Self {
            fault_factory: None,
            classifier: None,
            registries: HashMap::new(),
            problems: Vec::new(),
        }
    }

    pub fn fault_factory(
        mut self,
        fault_factory: impl FaultObjectFactory<H> + Send + Sync + 'static,
    ) -> Self {
        self.fault_factory = Some(Arc::new(fault_factory));
        self
    }

    pub fn outdate_classifier(
        mut self,
        classifier: impl OutdateClassifier<H> + Send + Sync + 'static,
    ) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Registers the version converters of parameters type `P`.
    pub fn converters<P: FeatureParameters<H>>(mut self, registry: ConverterRegistry<H>) -> Self {
        if P::version().is_none() {
            self.problems.push(format!(
                "converters registered for unversioned parameters `{}`",
                P::type_name()
            ));
        }

        self.registries.insert(TypeId::of::<P>(), Arc::new(registry));
        self
    }

    pub fn build(self) -> Result<ParametersParser<H>, ParamsError> {
        if let Some(reason) = self.problems.into_iter().next() {
            return Err(ParamsError::Config { reason });
        }

        let fault_factory = self.fault_factory.ok_or_else(|| ParamsError::Config {
            reason: "fault object factory is not set".to_string(),
        })?;

        let classifier = self.classifier.ok_or_else(|| ParamsError::Config {
            reason: "outdate state classifier is not set".to_string(),
        })?;

        Ok(ParametersParser {
            inner: Arc::new(ParserInner {
                fault_factory,
                classifier,
                registries: self.registries,
                schemas: RwLock::new(HashMap::new()),
            }),
        })
    }
}

impl<H: HostTypes> Default for ParserBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostTypes> ParametersParser<H> {
    pub fn builder() -> ParserBuilder<H> {
        ParserBuilder::new()
    }

    /// Schema of `P`, described on first use and cached afterwards.
    pub fn schema<P: FeatureParameters<H>>(&self) -> Result<Arc<ParameterSchema>, ParamsError> {
        let key = TypeId::of::<P>();
        {
            let schemas = self
                .inner
                .schemas
                .read()
                .map_err(|_| ParamsError::InternalPoisoned)?;
            if let Some(schema) = schemas.get(&key) {
                return Ok(Arc::clone(schema));
            }
        }

        let described = Arc::new(ParameterSchema::describe::<H, P>()?);
        let mut schemas = self
            .inner
            .schemas
            .write()
            .map_err(|_| ParamsError::InternalPoisoned)?;

        Ok(Arc::clone(schemas.entry(key).or_insert(described)))
    }

    /// Serializes `parameters` for writing to a feature.
    pub fn parse<P: FeatureParameters<H>>(
        &self,
        parameters: &P,
    ) -> Result<SerializedParameters<H>, ParamsError> {
        let schema = self.schema::<P>()?;
        serialize::serialize(&schema, Some(parameters))
    }

    pub fn deserialize<P: FeatureParameters<H>>(
        &self,
        raw: &RawParameters<H>,
        feature: &H::Feature,
    ) -> Result<DeserializedParameters<P, H>, ParamsError> {
        let schema = self.schema::<P>()?;
        let context = DeserializeContext {
            fault_factory: &*self.inner.fault_factory,
            classifier: &*self.inner.classifier,
            registry: self
                .inner
                .registries
                .get(&TypeId::of::<P>())
                .map(|registry| &**registry),
        };

        deserialize::deserialize(&schema, raw, feature, &context)
    }

    /// Reads the persisted parameters of `feature` and rebuilds `P`.
    pub fn get_parameters<P, A>(
        &self,
        access: &A,
        feature: &H::Feature,
    ) -> Result<DeserializedParameters<P, H>, ParamsError>
    where
        P: FeatureParameters<H>,
        A: FeatureAccess<H> + ?Sized,
    {
        let raw = access.read_parameters(feature)?;
        self.deserialize(&raw, feature)
    }

    /// Writes `parameters` back to `feature`.
    ///
    /// The feature's live driving dimensions must match the dimension slots of
    /// `P` one to one; otherwise nothing is written.
    pub fn set_parameters<P, A>(
        &self,
        access: &mut A,
        feature: &H::Feature,
        parameters: &P,
    ) -> Result<OutdateState, ParamsError>
    where
        P: FeatureParameters<H>,
        A: FeatureAccess<H> + ?Sized,
    {
        let serialized = self.parse(parameters)?;
        let live = access.dimensions(feature);

        if let Some(live) = live.as_ref() {
            if live.len() != serialized.dimensions.len() {
                return Err(ParamsError::Mismatch {
                    expected: serialized.dimensions.len(),
                    actual: live.len(),
                });
            }
        }

        let state = self
            .inner
            .classifier
            .classify(feature, live.as_deref().unwrap_or_default());

        access.write_parameters(feature, &serialized)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            type_name = P::type_name(),
            %state,
            dimensions = serialized.dimensions.len(),
            "wrote custom feature parameters"
        );

        Ok(state)
    }
}

impl<H: HostTypes> Clone for ParametersParser<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: HostTypes> std::fmt::Debug for ParametersParser<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParametersParser")
            .field("registries", &self.inner.registries.len())
            .finish()
    }
}
