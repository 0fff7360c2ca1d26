//! Positional references between typed parameters and the host's flat arrays.
//!
//! Selections and edit bodies share one backing array per kind; an object that
//! appears under several properties (or several times in one list) is stored
//! once and every occurrence points at its first index. Dimensions follow a
//! different rule: each dimension property owns the slot matching its
//! encounter order, whatever its value, because the host addresses driving
//! dimensions positionally.

use crate::error::ParamsError;
use crate::model::value::References;

/// Index encoding "no object".
pub const ABSENT_INDEX: i32 = -1;

/// Indices of one property into its backing array, persisted as comma-joined
/// text (`"0,2,-1"`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexList {
    indices: Vec<i32>,
}

impl IndexList {
    /// The `[-1]` list written for absent or empty properties.
    pub fn absent() -> Self {
        Self {
            indices: vec![ABSENT_INDEX],
        }
    }

    pub fn indices(&self) -> &[i32] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// True for exactly `[-1]`.
    pub fn is_absent(&self) -> bool {
        self.indices == [ABSENT_INDEX]
    }

    pub fn parse(property: &str, text: &str) -> Result<Self, ParamsError> {
        let invalid = || ParamsError::InvalidIndexList {
            property: property.to_string(),
            value: text.to_string(),
        };

        let indices = text
            .split(',')
            .map(|part| part.trim().parse::<i32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        if indices.iter().any(|index| *index < ABSENT_INDEX) {
            return Err(invalid());
        }

        Ok(Self { indices })
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for IndexList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for index in &self.indices {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{index}")?;
            first = false;
        }

        Ok(())
    }
}

/// Deduplicating backing array built while indexing properties.
#[derive(Debug)]
pub struct ReferenceArena<T> {
    objects: Vec<T>,
}

impl<T: PartialEq> ReferenceArena<T> {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Index of `object`, appending it when no equal object is stored yet.
    pub fn intern(&mut self, object: T) -> usize {
        if let Some(index) = self.objects.iter().position(|existing| *existing == object) {
            return index;
        }

        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Indexes one property's elements; an empty sequence encodes as `[-1]`.
    pub fn index(&mut self, elements: Vec<Option<T>>) -> IndexList {
        if elements.is_empty() {
            return IndexList::absent();
        }

        let indices = elements
            .into_iter()
            .map(|element| match element {
                Some(object) => self.intern(object) as i32,
                None => ABSENT_INDEX,
            })
            .collect();

        IndexList { indices }
    }

    pub fn into_objects(self) -> Vec<T> {
        self.objects
    }
}

impl<T: PartialEq> Default for ReferenceArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Indexes property groups in order and returns their index lists together
/// with the deduplicated backing array.
pub fn assign<T: PartialEq>(
    groups: Vec<(&'static str, Vec<Option<T>>)>,
) -> (Vec<(&'static str, IndexList)>, Vec<T>) {
    let mut arena = ReferenceArena::new();
    let index_lists = groups
        .into_iter()
        .map(|(property, elements)| (property, arena.index(elements)))
        .collect();

    (index_lists, arena.into_objects())
}

/// Hands out dimension slots in encounter order. Slots are never shared, even
/// between dimensions holding equal values.
#[derive(Debug, Default)]
pub struct DimensionSlotAllocator {
    next: usize,
}

impl DimensionSlotAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_slot(&mut self) -> usize {
        let slot = self.next;
        self.next += 1;
        slot
    }

    pub fn allocated(&self) -> usize {
        self.next
    }
}

/// Resolves `indices` against `backing`.
///
/// `-1` yields no element. A slot the host reports as unresolvable (`None`)
/// yields the placeholder produced by `fault`, so a feature whose input
/// geometry was deleted still loads. An index past the end of `backing` is an
/// error.
pub fn resolve<T: Clone>(
    property: &str,
    indices: &IndexList,
    backing: &[Option<T>],
    list: bool,
    fault: impl Fn() -> T,
) -> Result<References<T>, ParamsError> {
    if let Some(index) = indices
        .indices()
        .iter()
        .find(|index| **index != ABSENT_INDEX && **index as usize >= backing.len())
    {
        return Err(ParamsError::Index {
            property: property.to_string(),
            index: *index as usize,
            bound: backing.len(),
        });
    }

    let element = |index: i32| -> Option<T> {
        if index == ABSENT_INDEX {
            return None;
        }

        match &backing[index as usize] {
            Some(object) => Some(object.clone()),
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    property,
                    index,
                    "referenced entity is missing; substituting a fault object"
                );
                Some(fault())
            }
        }
    };

    if list {
        if indices.is_absent() {
            return Ok(References::List(None));
        }

        let elements = indices.indices().iter().map(|index| element(*index)).collect();
        return Ok(References::List(Some(elements)));
    }

    match indices.indices() {
        [index] => Ok(References::Single(element(*index))),
        other => Err(ParamsError::Multiplicity {
            property: property.to_string(),
            count: other.len(),
        }),
    }
}
