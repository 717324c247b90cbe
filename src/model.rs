//! Query interface to the finite element domain and an in-memory implementation of it.
//!
//! The structure builder does not know about meshes, elements or boundary conditions as such.
//! It only needs to know which equations each element and boundary condition touches, and
//! which equations the degrees of freedom of each entity are numbered with. These questions are
//! captured by [`FiniteElementDomain`].
use serde::{Deserialize, Serialize};

/// A 1-based global equation number. Zero or negative numbers denote degrees of freedom
/// that are not part of the live system (e.g. constrained).
pub type EquationNumber = i64;

/// Maps an equation number to its 0-based equation index, or `None` if the number does not
/// refer to a live equation.
#[inline]
pub fn equation_index(number: EquationNumber) -> Option<usize> {
    if number > 0 {
        Some((number - 1) as usize)
    } else {
        None
    }
}

/// A single degree of freedom of an entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dof {
    /// A primary unknown with the given equation number (non-positive if constrained).
    Primary(EquationNumber),
    /// A degree of freedom that depends on other unknowns and has no equation of its own.
    Dependent,
}

impl Dof {
    pub fn is_primary(&self) -> bool {
        matches!(self, Dof::Primary(_))
    }

    /// The equation number used in location arrays. Dependent dofs are never assembled.
    pub fn equation_number(&self) -> EquationNumber {
        match self {
            Dof::Primary(number) => *number,
            Dof::Dependent => 0,
        }
    }
}

/// Identifies an entity owning degrees of freedom.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DofEntity {
    /// An ordinary entity of the mesh, typically a node.
    Ordinary(usize),
    /// An internal entity owned by a boundary condition, e.g. a Lagrange multiplier.
    BoundaryConditionInternal { bc: usize, index: usize },
    /// An internal entity owned by an element, e.g. for enhanced modes.
    ElementInternal { element: usize, index: usize },
}

/// A pair of row and column location arrays contributed by a boundary condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationArrays {
    pub rows: Vec<EquationNumber>,
    pub columns: Vec<EquationNumber>,
}

impl LocationArrays {
    pub fn new(rows: Vec<EquationNumber>, columns: Vec<EquationNumber>) -> Self {
        Self { rows, columns }
    }
}

/// Queries answered by the finite element domain under a fixed equation numbering.
pub trait FiniteElementDomain {
    /// Total number of equations of the numbering.
    fn num_equations(&self) -> usize;

    /// Number of ordinary entities owning degrees of freedom.
    fn num_dof_entities(&self) -> usize;

    fn num_elements(&self) -> usize;

    fn num_boundary_conditions(&self) -> usize;

    /// Whether the boundary condition contributes rows, columns and internal entities
    /// to the system.
    fn is_active_boundary_condition(&self, bc_index: usize) -> bool;

    fn num_element_internal_entities(&self, element_index: usize) -> usize;

    fn num_boundary_condition_internal_entities(&self, bc_index: usize) -> usize;

    /// Replaces the contents of `output` with the degrees of freedom of the given entity.
    fn populate_entity_dofs(&self, entity: DofEntity, output: &mut Vec<Dof>);

    /// Replaces the contents of `output` with the location array of the given element.
    ///
    /// Rows and columns of element contributions share the same location array.
    fn populate_element_locations(&self, element_index: usize, output: &mut Vec<EquationNumber>);

    /// Replaces the contents of `output` with the location array pairs of the given
    /// boundary condition. Inactive boundary conditions contribute no pairs.
    fn populate_boundary_condition_locations(&self, bc_index: usize, output: &mut Vec<LocationArrays>);
}

/// All entities owning degrees of freedom, in block map order: ordinary entities,
/// then internal entities of active boundary conditions, then internal entities of elements.
pub fn dof_entities<'a>(domain: &'a dyn FiniteElementDomain) -> impl 'a + Iterator<Item = DofEntity> {
    let ordinary = (0..domain.num_dof_entities()).map(DofEntity::Ordinary);
    let bc_internal = (0..domain.num_boundary_conditions())
        .filter(move |&bc| domain.is_active_boundary_condition(bc))
        .flat_map(move |bc| {
            (0..domain.num_boundary_condition_internal_entities(bc))
                .map(move |index| DofEntity::BoundaryConditionInternal { bc, index })
        });
    let element_internal = (0..domain.num_elements()).flat_map(move |element| {
        (0..domain.num_element_internal_entities(element))
            .map(move |index| DofEntity::ElementInternal { element, index })
    });
    ordinary.chain(bc_internal).chain(element_internal)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Indices of the ordinary entities the element connects.
    pub entities: Vec<usize>,
    /// Degrees of freedom of each internal entity of the element.
    pub internal: Vec<Vec<Dof>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub active: bool,
    pub locations: Vec<LocationArrays>,
    /// Degrees of freedom of each internal entity of the boundary condition.
    pub internal: Vec<Vec<Dof>>,
}

impl BoundaryCondition {
    /// An active boundary condition with the given location array pairs and no internal entities.
    pub fn active(locations: Vec<LocationArrays>) -> Self {
        Self {
            active: true,
            locations,
            internal: Vec::new(),
        }
    }

    pub fn with_internal_entities(mut self, internal: Vec<Vec<Dof>>) -> Self {
        self.internal = internal;
        self
    }
}

/// A simple in-memory finite element domain with an explicit equation numbering.
///
/// The location array of an element consists of the equation numbers of the degrees of freedom
/// of its entities, in order, followed by those of its internal entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainModel {
    entities: Vec<Vec<Dof>>,
    elements: Vec<Element>,
    boundary_conditions: Vec<BoundaryCondition>,
}

impl DomainModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an ordinary entity with the given degrees of freedom and returns its index.
    pub fn add_entity(&mut self, dofs: Vec<Dof>) -> usize {
        self.entities.push(dofs);
        self.entities.len() - 1
    }

    /// Adds an element connecting the given ordinary entities and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if any entity index is out of bounds.
    pub fn add_element(&mut self, entities: Vec<usize>) -> usize {
        self.add_element_with_internal_entities(entities, Vec::new())
    }

    /// Same as `add_element`, but the element additionally owns internal entities.
    pub fn add_element_with_internal_entities(&mut self, entities: Vec<usize>, internal: Vec<Vec<Dof>>) -> usize {
        for &entity in &entities {
            assert!(
                entity < self.entities.len(),
                "Element references entity {} out of bounds",
                entity
            );
        }
        self.elements.push(Element { entities, internal });
        self.elements.len() - 1
    }

    pub fn add_boundary_condition(&mut self, bc: BoundaryCondition) -> usize {
        self.boundary_conditions.push(bc);
        self.boundary_conditions.len() - 1
    }

    pub fn entities(&self) -> &[Vec<Dof>] {
        &self.entities
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn boundary_conditions(&self) -> &[BoundaryCondition] {
        &self.boundary_conditions
    }

    fn all_dofs(&self) -> impl '_ + Iterator<Item = &Dof> {
        let element_internal = self.elements.iter().flat_map(|e| e.internal.iter());
        let bc_internal = self
            .boundary_conditions
            .iter()
            .flat_map(|bc| bc.internal.iter());
        self.entities
            .iter()
            .chain(element_internal)
            .chain(bc_internal)
            .flatten()
    }
}

impl FiniteElementDomain for DomainModel {
    /// The largest equation number referenced by any degree of freedom or location array.
    fn num_equations(&self) -> usize {
        let max_dof_equation = self
            .all_dofs()
            .map(Dof::equation_number)
            .max()
            .unwrap_or(0);
        let max_bc_equation = self
            .boundary_conditions
            .iter()
            .flat_map(|bc| bc.locations.iter())
            .flat_map(|arrays| arrays.rows.iter().chain(arrays.columns.iter()))
            .copied()
            .max()
            .unwrap_or(0);
        max_dof_equation.max(max_bc_equation).max(0) as usize
    }

    fn num_dof_entities(&self) -> usize {
        self.entities.len()
    }

    fn num_elements(&self) -> usize {
        self.elements.len()
    }

    fn num_boundary_conditions(&self) -> usize {
        self.boundary_conditions.len()
    }

    fn is_active_boundary_condition(&self, bc_index: usize) -> bool {
        self.boundary_conditions[bc_index].active
    }

    fn num_element_internal_entities(&self, element_index: usize) -> usize {
        self.elements[element_index].internal.len()
    }

    fn num_boundary_condition_internal_entities(&self, bc_index: usize) -> usize {
        self.boundary_conditions[bc_index].internal.len()
    }

    fn populate_entity_dofs(&self, entity: DofEntity, output: &mut Vec<Dof>) {
        let dofs = match entity {
            DofEntity::Ordinary(index) => &self.entities[index],
            DofEntity::BoundaryConditionInternal { bc, index } => &self.boundary_conditions[bc].internal[index],
            DofEntity::ElementInternal { element, index } => &self.elements[element].internal[index],
        };
        output.clear();
        output.extend_from_slice(dofs);
    }

    fn populate_element_locations(&self, element_index: usize, output: &mut Vec<EquationNumber>) {
        let element = &self.elements[element_index];
        output.clear();
        let entity_dofs = element
            .entities
            .iter()
            .flat_map(|&entity| self.entities[entity].iter());
        let internal_dofs = element.internal.iter().flatten();
        output.extend(entity_dofs.chain(internal_dofs).map(Dof::equation_number));
    }

    fn populate_boundary_condition_locations(&self, bc_index: usize, output: &mut Vec<LocationArrays>) {
        let bc = &self.boundary_conditions[bc_index];
        output.clear();
        if bc.active {
            output.extend_from_slice(&bc.locations);
        }
    }
}

/// Creates a chain of `num_entities` entities with `dofs_per_entity` degrees of freedom each,
/// connected by two-entity elements between consecutive entities.
///
/// Equations are numbered consecutively, entity by entity, skipping the degrees of freedom
/// of the entities listed in `constrained_entities`, which receive equation number 0.
pub fn create_chain_domain(num_entities: usize, dofs_per_entity: usize, constrained_entities: &[usize]) -> DomainModel {
    let mut domain = DomainModel::new();
    let mut next_equation = 1;
    for entity in 0..num_entities {
        let constrained = constrained_entities.contains(&entity);
        let dofs = (0..dofs_per_entity)
            .map(|_| {
                if constrained {
                    Dof::Primary(0)
                } else {
                    next_equation += 1;
                    Dof::Primary(next_equation - 1)
                }
            })
            .collect();
        domain.add_entity(dofs);
    }
    for entity in 1..num_entities {
        domain.add_element(vec![entity - 1, entity]);
    }
    domain
}
