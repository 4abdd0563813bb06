//! # Grid navigation
//!
//! A planar obstacle grid with A* pathfinding, plus a simple agent that walks
//! the computed paths. Together they stand in for an engine's navigation mesh:
//! [`NavGrid`] answers [`NavQuery`] and [`LineOfSight`] queries and
//! [`GridAgent`] implements [`NavAgent`].
//!
//! ## Example Usage
//!
//! ```rust
//! use std::rc::Rc;
//! use warden_ai::{GridAgent, NavAgent, NavGrid};
//! use warden_core::{Dt, Transform, Vec3, shared};
//!
//! let mut grid = NavGrid::new(0.5, Vec3::new(-10.0, 0.0, -10.0), Vec3::new(10.0, 0.0, 10.0));
//! grid.add_obstacle(Vec3::new(0.0, 0.0, 2.0), Vec3::new(1.0, 1.0, 0.5));
//!
//! let body = shared(Transform::default());
//! let mut agent = GridAgent::new(Rc::new(grid), body.clone(), 3.0);
//! assert!(agent.set_destination(Vec3::new(0.0, 0.0, 5.0)));
//! agent.step(Dt::from_millis(100));
//! ```

use crate::nav::{NavAgent, NavQuery};
use crate::perception::LineOfSight;
use cgmath::{InnerSpace, Zero};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::rc::Rc;
use warden_core::{Dt, Shared, Transform, Vec3, flatten};

/// Leftover distances below this count as arrived.
const ARRIVE_EPSILON: f32 = 1e-3;

/// Cell of the planar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub x: i32,
    pub z: i32,
}

impl GridPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Convert world position to grid position
    pub fn from_world_pos(world_pos: Vec3, cell_size: f32) -> Self {
        Self {
            x: (world_pos.x / cell_size).round() as i32,
            z: (world_pos.z / cell_size).round() as i32,
        }
    }

    /// Convert grid position to world position, on the ground plane
    pub fn to_world_pos(self, cell_size: f32) -> Vec3 {
        Vec3::new(self.x as f32 * cell_size, 0.0, self.z as f32 * cell_size)
    }

    /// Calculate Manhattan distance between two grid positions
    pub fn manhattan_distance(self, other: GridPos) -> i32 {
        (self.x - other.x).abs() + (self.z - other.z).abs()
    }

    /// Get the 4 edge-connected neighbors
    pub fn face_neighbors(self) -> [GridPos; 4] {
        [
            GridPos::new(self.x + 1, self.z),
            GridPos::new(self.x - 1, self.z),
            GridPos::new(self.x, self.z + 1),
            GridPos::new(self.x, self.z - 1),
        ]
    }
}

/// Node used in the A* algorithm priority queue
#[derive(Debug, Clone)]
struct AStarNode {
    position: GridPos,
    g_cost: f32,
    h_cost: f32,
}

impl AStarNode {
    fn f_cost(&self) -> f32 {
        self.g_cost + self.h_cost
    }
}

impl PartialEq for AStarNode {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for AStarNode {}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .f_cost()
            .partial_cmp(&self.f_cost())
            .unwrap_or(Ordering::Equal)
    }
}

/// Walkable area made of square cells, some of them blocked.
#[derive(Debug, Clone)]
pub struct NavGrid {
    obstacles: HashSet<GridPos>,
    cell_size: f32,
    min: GridPos,
    max: GridPos,
}

impl NavGrid {
    /// Creates an empty grid covering the rectangle between `min` and `max`.
    ///
    /// # Arguments
    ///
    /// * `cell_size` - Edge length of a cell.
    /// * `min` - One corner of the walkable rectangle.
    /// * `max` - The opposite corner.
    pub fn new(cell_size: f32, min: Vec3, max: Vec3) -> Self {
        let a = GridPos::from_world_pos(min, cell_size);
        let b = GridPos::from_world_pos(max, cell_size);
        Self {
            obstacles: HashSet::new(),
            cell_size,
            min: GridPos::new(a.x.min(b.x), a.z.min(b.z)),
            max: GridPos::new(a.x.max(b.x), a.z.max(b.z)),
        }
    }

    /// Blocks every cell touched by an axis-aligned box.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the box.
    /// * `half_extents` - Half of the box size on each axis.
    pub fn add_obstacle(&mut self, center: Vec3, half_extents: Vec3) {
        let min_grid = GridPos::from_world_pos(center - half_extents, self.cell_size);
        let max_grid = GridPos::from_world_pos(center + half_extents, self.cell_size);

        for x in min_grid.x..=max_grid.x {
            for z in min_grid.z..=max_grid.z {
                self.obstacles.insert(GridPos::new(x, z));
            }
        }
    }

    /// Check if a grid position is an obstacle
    pub fn is_obstacle(&self, pos: GridPos) -> bool {
        self.obstacles.contains(&pos)
    }

    /// Whether a cell is inside the grid and not blocked.
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.z >= self.min.z
            && pos.z <= self.max.z
            && !self.is_obstacle(pos)
    }

    /// Get the cell size
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Find a path from start to goal using A* algorithm.
    ///
    /// The returned waypoints skip the start cell and end exactly at `goal`.
    pub fn find_path(&self, start: Vec3, goal: Vec3) -> Option<Vec<Vec3>> {
        let start_grid = GridPos::from_world_pos(start, self.cell_size);
        let goal_grid = GridPos::from_world_pos(goal, self.cell_size);

        if !self.is_walkable(goal_grid) {
            return None;
        }
        if start_grid == goal_grid {
            return Some(vec![goal]);
        }

        let mut open_set = BinaryHeap::new();
        let mut closed_set = HashSet::new();
        let mut g_scores = HashMap::new();
        let mut came_from = HashMap::new();

        open_set.push(AStarNode {
            position: start_grid,
            g_cost: 0.0,
            h_cost: self.heuristic(start_grid, goal_grid),
        });
        g_scores.insert(start_grid, 0.0);

        while let Some(current) = open_set.pop() {
            let current_pos = current.position;

            if current_pos == goal_grid {
                let mut path = self.reconstruct_path(&came_from, current_pos);
                if let Some(last) = path.last_mut() {
                    *last = goal;
                }
                return Some(path);
            }

            if !closed_set.insert(current_pos) {
                continue;
            }

            for neighbor_pos in current_pos.face_neighbors() {
                if closed_set.contains(&neighbor_pos) || !self.is_walkable(neighbor_pos) {
                    continue;
                }

                let tentative_g_score = current.g_cost + 1.0;
                let neighbor_g_score = g_scores
                    .get(&neighbor_pos)
                    .copied()
                    .unwrap_or(f32::INFINITY);

                if tentative_g_score < neighbor_g_score {
                    came_from.insert(neighbor_pos, current_pos);
                    g_scores.insert(neighbor_pos, tentative_g_score);
                    open_set.push(AStarNode {
                        position: neighbor_pos,
                        g_cost: tentative_g_score,
                        h_cost: self.heuristic(neighbor_pos, goal_grid),
                    });
                }
            }
        }

        None
    }

    /// Heuristic function for A* (Manhattan distance)
    fn heuristic(&self, from: GridPos, to: GridPos) -> f32 {
        from.manhattan_distance(to) as f32
    }

    /// Reconstruct the path from came_from map, without the start cell
    fn reconstruct_path(
        &self,
        came_from: &HashMap<GridPos, GridPos>,
        mut current: GridPos,
    ) -> Vec<Vec3> {
        let mut path = Vec::new();

        while let Some(&parent) = came_from.get(&current) {
            path.push(current.to_world_pos(self.cell_size));
            current = parent;
        }

        path.reverse();
        path
    }
}

impl NavQuery for NavGrid {
    fn sample_position(&self, near: Vec3, max_distance: f32) -> Option<Vec3> {
        let center = GridPos::from_world_pos(near, self.cell_size);
        if self.is_walkable(center) {
            return Some(near);
        }

        let reach = (max_distance / self.cell_size).ceil() as i32;
        let mut best: Option<(f32, Vec3)> = None;
        for dx in -reach..=reach {
            for dz in -reach..=reach {
                let cell = GridPos::new(center.x + dx, center.z + dz);
                if !self.is_walkable(cell) {
                    continue;
                }
                let mut point = cell.to_world_pos(self.cell_size);
                point.y = near.y;
                let distance = (point - near).magnitude();
                if distance <= max_distance && best.is_none_or(|(d, _)| distance < d) {
                    best = Some((distance, point));
                }
            }
        }

        best.map(|(_, point)| point)
    }
}

impl LineOfSight for NavGrid {
    fn is_blocked(&self, from: Vec3, to: Vec3) -> bool {
        let delta = flatten(to - from);
        let length = delta.magnitude();
        let steps = ((length / (self.cell_size * 0.5)).ceil() as i32).max(1);

        (0..=steps).any(|i| {
            let point = from + delta * (i as f32 / steps as f32);
            self.is_obstacle(GridPos::from_world_pos(point, self.cell_size))
        })
    }
}

/// Agent that follows A* paths on a [`NavGrid`] at a constant speed.
///
/// Paths are planned synchronously, so a path is never pending. The agent
/// writes its position into the shared body transform on every
/// [`step`](Self::step).
#[derive(Debug)]
pub struct GridAgent {
    grid: Rc<NavGrid>,
    body: Shared<Transform>,
    /// Movement speed
    pub speed: f32,
    /// Distance from the destination at which the agent halts
    pub stopping_distance: f32,
    path: Vec<Vec3>,
    current_waypoint: usize,
    velocity: Vec3,
    stopped: bool,
}

impl GridAgent {
    pub fn new(grid: Rc<NavGrid>, body: Shared<Transform>, speed: f32) -> Self {
        Self {
            grid,
            body,
            speed,
            stopping_distance: 0.1,
            path: Vec::new(),
            current_waypoint: 0,
            velocity: Vec3::zero(),
            stopped: false,
        }
    }

    /// Get the current waypoint, if any
    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.path.get(self.current_waypoint).copied()
    }

    /// Moves the body along the path for one frame.
    pub fn step(&mut self, dt: Dt) {
        let seconds = dt.as_secs_f32();
        let remaining = self.remaining_distance() - self.stopping_distance;
        if self.stopped || seconds <= 0.0 || remaining <= ARRIVE_EPSILON {
            self.velocity = Vec3::zero();
            return;
        }

        let mut body = self.body.borrow_mut();
        let start = body.pos;
        let mut budget = (self.speed * seconds).min(remaining);

        while budget > 0.0 {
            let Some(waypoint) = self.path.get(self.current_waypoint).copied() else {
                break;
            };
            let to_waypoint = flatten(waypoint - body.pos);
            let distance = to_waypoint.magnitude();

            if distance <= budget {
                body.pos.x = waypoint.x;
                body.pos.z = waypoint.z;
                budget -= distance;
                self.current_waypoint += 1;
            } else {
                body.pos += to_waypoint / distance * budget;
                budget = 0.0;
            }
        }

        self.velocity = (body.pos - start) / seconds;
    }
}

impl NavAgent for GridAgent {
    fn set_destination(&mut self, point: Vec3) -> bool {
        let start = self.body.borrow().pos;
        match self.grid.find_path(start, point) {
            Some(path) => {
                self.path = path;
                self.current_waypoint = 0;
                true
            }
            None => false,
        }
    }

    fn is_path_pending(&self) -> bool {
        false
    }

    fn remaining_distance(&self) -> f32 {
        let mut from = self.body.borrow().pos;
        let mut total = 0.0;
        for waypoint in &self.path[self.current_waypoint.min(self.path.len())..] {
            total += flatten(*waypoint - from).magnitude();
            from = *waypoint;
        }
        total
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
        if stopped {
            self.velocity = Vec3::zero();
        }
    }
}
