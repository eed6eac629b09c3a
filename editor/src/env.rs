use common::{
    proto::{
        EdgeStatus,
        CheckPoseResponse,
    },
    problem::{
        Pose,
        Point,
        Problem,
        PoseImportError,
        ProblemBonusType,
    },
};

use crate::{
    draw,
};

// pointer thresholds, canvas pixels
const DRAG_TRIGGER_SENSE_SQUARED: f64 = 100.0;
const VERTEX_CHOOSE_SENSE: f64 = 10.0;

const NUDGE_STEP: i64 = 1;
const NUDGE_STEP_FAST: i64 = 10;

// grid dots are skipped for frames larger than this
const GRID_DOT_LIMIT: i64 = 16384;

const CLR_HOLE: [f32; 4] = [0.47, 0.47, 0.47, 1.0];
const CLR_GRID: [f32; 4] = [0.27, 0.27, 0.27, 1.0];
const CLR_OK_EDGE: [f32; 4] = [0.0, 0.78, 0.05, 1.0];
const CLR_SHORT_EDGE: [f32; 4] = [0.7, 0.0, 1.0, 1.0];
const CLR_LONG_EDGE: [f32; 4] = [0.82, 0.0, 0.0, 1.0];
const CLR_SELECTED: [f32; 4] = [1.0, 0.85, 0.0, 1.0];
const CLR_DESELECTED: [f32; 4] = [0.63, 0.63, 0.63, 1.0];
const CLR_HOVER: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const CLR_EDGE_LIMITS: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
const CLR_RUBBER_BAND: [f32; 4] = [1.0, 0.85, 0.0, 0.8];

const CLR_BONUS_BREAK_A_LEG: [f32; 4] = [0.2, 0.4, 1.0, 1.0];
const CLR_BONUS_GLOBALIST: [f32; 4] = [1.0, 0.8, 0.2, 1.0];
const CLR_BONUS_WALLHACK: [f32; 4] = [1.0, 0.45, 0.1, 1.0];
const CLR_BONUS_SUPERFLEX: [f32; 4] = [0.0, 1.0, 1.0, 1.0];

/// Bounding box of hole and original figure in grid coordinates, padded so
/// that no puzzle point is drawn flush against a canvas edge. Computed once
/// per loaded problem.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Frame {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

#[derive(Debug)]
pub enum CreateError {
    NoPointsInHole,
    NoPointsInFigure,
}

impl Frame {
    pub fn compute(problem: &Problem) -> Result<Frame, CreateError> {
        if problem.hole.is_empty() {
            return Err(CreateError::NoPointsInHole);
        }
        if problem.figure.vertices.is_empty() {
            return Err(CreateError::NoPointsInFigure);
        }

        let points = || problem.hole.iter().chain(problem.figure.vertices.iter());
        let min_x = points().map(|p| p.0).min().ok_or(CreateError::NoPointsInHole)?;
        let min_y = points().map(|p| p.1).min().ok_or(CreateError::NoPointsInHole)?;
        let max_x = points().map(|p| p.0).max().ok_or(CreateError::NoPointsInHole)?;
        let max_y = points().map(|p| p.1).max().ok_or(CreateError::NoPointsInHole)?;

        Ok(Frame {
            min_x: min_x - 1,
            min_y: min_y - 1,
            max_x: max_x + 2,
            max_y: max_y + 2,
        })
    }
}

/// The only place performing grid <-> pixel arithmetic. Scale factors are
/// fixed for a given window size and frame; the border/console margins are
/// the window -> canvas offset.
pub struct ViewportTranslator {
    console_height: u32,
    border_width: u32,
    scale_x: f64,
    scale_y: f64,
    min_x: i64,
    min_y: i64,
}

impl ViewportTranslator {
    pub fn x(&self, grid_x: i64) -> f64 {
        (self.scale_x * (grid_x - self.min_x) as f64).floor() + 0.5 + self.border_width as f64
    }

    pub fn y(&self, grid_y: i64) -> f64 {
        (self.scale_y * (grid_y - self.min_y) as f64).floor() + 0.5 + self.console_height as f64
    }

    pub fn pos(&self, point: Point) -> [f64; 2] {
        [self.x(point.0), self.y(point.1)]
    }

    // Inverse transforms snap to the nearest grid point, not the floor one:
    // floor snapping biased vertex placement half a cell up-left.
    pub fn grid_x(&self, pixel_x: f64) -> i64 {
        ((pixel_x - self.border_width as f64 - 0.5) / self.scale_x + self.min_x as f64 + 0.5).floor() as i64
    }

    pub fn grid_y(&self, pixel_y: f64) -> i64 {
        ((pixel_y - self.console_height as f64 - 0.5) / self.scale_y + self.min_y as f64 + 0.5).floor() as i64
    }

    pub fn grid(&self, pixel: [f64; 2]) -> Point {
        Point(self.grid_x(pixel[0]), self.grid_y(pixel[1]))
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum MouseState {
    Idle,
    Armed { origin: [f64; 2], },
    DraggingVertex { vertex: usize, },
    RubberBanding { origin: [f64; 2], },
}

#[derive(Debug)]
pub enum DrawError {
    NoPointsInHole,
    InvalidEdgeSourceIndex { edge: common::problem::Edge, index: usize, },
    InvalidEdgeTargetIndex { edge: common::problem::Edge, index: usize, },
}

/// Editor session: the loaded problem, the mutable pose with selection and
/// undo history, the pointer state machine and the latest collaborator
/// check result. All mutation happens on the event loop thread.
pub struct Env {
    screen_width: u32,
    screen_height: u32,
    console_height: u32,
    border_width: u32,
    problem: Problem,
    frame: Frame,
    pose: Pose,
    selected: Vec<bool>,
    history: Vec<Pose>,
    check_result: Option<CheckPoseResponse>,
    mouse: MouseState,
    cursor: Option<[f64; 2]>,
    shift_held: bool,
    ctrl_held: bool,
    show_circles: bool,
    pose_changed: bool,
}

impl Env {
    pub fn new(
        problem: Problem,
        screen_width: u32,
        screen_height: u32,
        console_height: u32,
        border_width: u32,
    )
        -> Result<Env, CreateError>
    {
        let frame = Frame::compute(&problem)?;
        let pose = problem.export_pose();
        let selected = vec![false; pose.vertices.len()];
        let history = vec![pose.clone()];

        Ok(Env {
            screen_width,
            screen_height,
            console_height,
            border_width,
            problem,
            frame,
            pose,
            selected,
            history,
            check_result: None,
            mouse: MouseState::Idle,
            cursor: None,
            shift_held: false,
            ctrl_held: false,
            show_circles: false,
            pose_changed: true,
        })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn selected(&self) -> &[bool] {
        &self.selected
    }

    pub fn shift_held(&self) -> bool {
        self.shift_held
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.screen_width = width;
        self.screen_height = height;
    }

    pub fn translator(&self) -> Option<ViewportTranslator> {
        let w = self.screen_width;
        let h = self.screen_height;

        if (w <= 2 * self.border_width) || (h <= self.border_width + self.console_height) {
            None
        } else {
            Some(ViewportTranslator {
                console_height: self.console_height,
                border_width: self.border_width,
                scale_x: (w - (self.border_width * 2)) as f64 / (self.frame.max_x - self.frame.min_x) as f64,
                scale_y: (h - (self.border_width + self.console_height)) as f64 / (self.frame.max_y - self.frame.min_y) as f64,
                min_x: self.frame.min_x,
                min_y: self.frame.min_y,
            })
        }
    }

    // -- pose state primitives --

    pub fn move_selected(&mut self, dx: i64, dy: i64) {
        for (vertex, &sel) in self.pose.vertices.iter_mut().zip(self.selected.iter()) {
            if sel {
                vertex.0 += dx;
                vertex.1 += dy;
            }
        }
    }

    pub fn set_vertex(&mut self, index: usize, point: Point) {
        if let Some(vertex) = self.pose.vertices.get_mut(index) {
            *vertex = point;
        }
    }

    pub fn toggle_selection(&mut self, index: usize) {
        if let Some(flag) = self.selected.get_mut(index) {
            *flag = !*flag;
        }
    }

    pub fn select_all(&mut self) {
        for flag in &mut self.selected {
            *flag = true;
        }
    }

    pub fn select_none(&mut self) {
        for flag in &mut self.selected {
            *flag = false;
        }
    }

    /// Adds every vertex inside the closed grid rectangle to the selection,
    /// whichever diagonal the corners describe.
    pub fn select_rect(&mut self, corner_a: Point, corner_b: Point) {
        let (min_x, max_x) = if corner_a.0 <= corner_b.0 { (corner_a.0, corner_b.0) } else { (corner_b.0, corner_a.0) };
        let (min_y, max_y) = if corner_a.1 <= corner_b.1 { (corner_a.1, corner_b.1) } else { (corner_b.1, corner_a.1) };
        for (flag, vertex) in self.selected.iter_mut().zip(self.pose.vertices.iter()) {
            if vertex.0 >= min_x && vertex.0 <= max_x && vertex.1 >= min_y && vertex.1 <= max_y {
                *flag = true;
            }
        }
    }

    fn single_selected(&self) -> Option<usize> {
        let mut found = None;
        for (index, &sel) in self.selected.iter().enumerate() {
            if sel {
                if found.is_some() {
                    return None;
                }
                found = Some(index);
            }
        }
        found
    }

    // -- history --

    fn commit(&mut self) {
        self.history.push(self.pose.clone());
        self.pose_changed = true;
    }

    /// Steps back one committed edit. The top history entry is the snapshot
    /// of the current pose, so both it and the previous entry are popped and
    /// the earlier one restored; the commit below pushes it back.
    pub fn undo(&mut self) {
        if self.history.len() < 2 {
            return;
        }
        self.history.pop();
        if let Some(previous) = self.history.pop() {
            self.pose = previous;
        }
        self.commit();
    }

    /// Signals one committed pose change since the last call; the caller
    /// reacts by requesting revalidation.
    pub fn take_pose_changed(&mut self) -> bool {
        let changed = self.pose_changed;
        self.pose_changed = false;
        changed
    }

    // -- edits delegated to the collaborator / external sources --

    pub fn apply_external_vertices(&mut self, vertices: Vec<Point>) -> Result<(), PoseImportError> {
        self.problem.accept_vertices(&mut self.pose, vertices)?;
        self.commit();
        Ok(())
    }

    pub fn import_solution(&mut self, pose: Pose) -> Result<(), PoseImportError> {
        let Pose { vertices, bonuses, } = pose;
        self.problem.accept_vertices(&mut self.pose, vertices)?;
        self.pose.bonuses = bonuses;
        self.commit();
        Ok(())
    }

    pub fn export_solution(&self) -> Pose {
        self.pose.clone()
    }

    pub fn figure_reset(&mut self) {
        self.pose.vertices = self.problem.figure.vertices.clone();
        self.commit();
    }

    pub fn set_check_result(&mut self, result: CheckPoseResponse) {
        self.check_result = Some(result);
    }

    // -- keyboard interaction --

    pub fn set_shift(&mut self, held: bool) {
        self.shift_held = held;
    }

    pub fn set_ctrl(&mut self, held: bool) {
        self.ctrl_held = held;
    }

    pub fn toggle_circles(&mut self) {
        self.show_circles = !self.show_circles;
    }

    pub fn nudge_selection(&mut self, dx: i64, dy: i64) {
        if !self.selected.iter().any(|&sel| sel) {
            return;
        }
        let step = if self.shift_held { NUDGE_STEP_FAST } else { NUDGE_STEP };
        self.move_selected(dx * step, dy * step);
        self.commit();
    }

    // -- pointer interaction --

    pub fn update_mouse_cursor(&mut self, position: [f64; 2]) {
        self.cursor = Some(position);
        match self.mouse {
            MouseState::Armed { origin, } => {
                let dx = position[0] - origin[0];
                let dy = position[1] - origin[1];
                if dx * dx + dy * dy > DRAG_TRIGGER_SENSE_SQUARED {
                    match self.nearby_vertex(origin) {
                        Some(vertex) => {
                            self.mouse = MouseState::DraggingVertex { vertex, };
                            self.drag_vertex_to(vertex, position);
                        },
                        None =>
                            self.mouse = MouseState::RubberBanding { origin, },
                    }
                }
            },
            MouseState::DraggingVertex { vertex, } =>
                self.drag_vertex_to(vertex, position),
            MouseState::Idle | MouseState::RubberBanding { .. } =>
                (),
        }
    }

    pub fn mouse_cursor_left(&mut self) {
        // an armed press is abandoned; a drag in progress survives re-entry
        if let MouseState::Armed { .. } = self.mouse {
            self.mouse = MouseState::Idle;
        }
    }

    pub fn mouse_down(&mut self) {
        if let Some(position) = self.cursor {
            self.mouse = MouseState::Armed { origin: position, };
        }
    }

    pub fn mouse_up(&mut self) {
        match self.mouse {
            MouseState::Idle =>
                (),
            MouseState::Armed { origin, } =>
                self.click(origin),
            MouseState::DraggingVertex { .. } =>
                self.commit(),
            MouseState::RubberBanding { origin, } =>
                if let Some(position) = self.cursor {
                    if let Some(tr) = self.translator() {
                        let corner_a = tr.grid(origin);
                        let corner_b = tr.grid(position);
                        if !self.ctrl_held && !self.shift_held {
                            self.select_none();
                        }
                        self.select_rect(corner_a, corner_b);
                    }
                },
        }
        self.mouse = MouseState::Idle;
    }

    fn click(&mut self, position: [f64; 2]) {
        if let Some(vertex) = self.nearby_vertex(position) {
            if !self.ctrl_held && !self.shift_held {
                self.select_none();
            }
            self.toggle_selection(vertex);
        }
    }

    fn nearby_vertex(&self, position: [f64; 2]) -> Option<usize> {
        let tr = self.translator()?;
        for (index, &vertex) in self.pose.vertices.iter().enumerate() {
            let p = tr.pos(vertex);
            let dx = p[0] - position[0];
            let dy = p[1] - position[1];
            if dx * dx + dy * dy < VERTEX_CHOOSE_SENSE * VERTEX_CHOOSE_SENSE {
                return Some(index);
            }
        }
        None
    }

    fn drag_vertex_to(&mut self, vertex: usize, position: [f64; 2]) {
        // live update only; the edit commits on release
        if let Some(tr) = self.translator() {
            let point = tr.grid(position);
            self.set_vertex(vertex, point);
        }
    }

    // -- rendering --

    pub fn console_text(&self) -> String {
        match &self.check_result {
            None =>
                "dislikes: waiting...".to_string(),
            Some(result) => {
                let mut text = format!("dislikes: {}", result.dislikes);
                if !result.valid {
                    text.push_str(" (not valid)");
                }
                if let Some(metric) = result.bonus_metric {
                    text.push_str(&format!(", bonus metric: {:.3}", metric));
                }
                if let Some(unlocked) = &result.unlocked {
                    let count = unlocked.iter().filter(|&&flag| flag).count();
                    if count > 0 {
                        text.push_str(&format!(", {} bonus(es) unlocked", count));
                    }
                }
                text
            },
        }
    }

    pub fn draw<DF>(&self, tr: &ViewportTranslator, mut draw_element: DF) -> Result<(), DrawError> where DF: FnMut(draw::DrawElement) {
        self.draw_grid(tr, &mut draw_element);
        self.draw_hole(tr, &mut draw_element)?;
        self.draw_bonuses(tr, &mut draw_element);
        self.draw_edges(tr, &mut draw_element)?;
        self.draw_vertices(tr, &mut draw_element);
        self.draw_circles(tr, &mut draw_element);
        self.draw_rubber_band(&mut draw_element);
        Ok(())
    }

    fn draw_grid<DF>(&self, tr: &ViewportTranslator, draw_element: &mut DF) where DF: FnMut(draw::DrawElement) {
        let area = (self.frame.max_x - self.frame.min_x) * (self.frame.max_y - self.frame.min_y);
        if area > GRID_DOT_LIMIT {
            return;
        }
        for grid_x in self.frame.min_x .. self.frame.max_x {
            for grid_y in self.frame.min_y .. self.frame.max_y {
                draw_element(draw::DrawElement::Ellipse {
                    color: CLR_GRID,
                    x: tr.x(grid_x),
                    y: tr.y(grid_y),
                    width: 2.0,
                    height: 2.0,
                    filled: true,
                });
            }
        }
    }

    fn draw_hole<DF>(&self, tr: &ViewportTranslator, draw_element: &mut DF) -> Result<(), DrawError> where DF: FnMut(draw::DrawElement) {
        let mut points_iter = self.problem.hole.iter();
        let mut prev_point = points_iter.next()
            .ok_or(DrawError::NoPointsInHole)?;
        for point in points_iter.chain(Some(prev_point)) {
            let source = tr.pos(*prev_point);
            let target = tr.pos(*point);
            draw_element(draw::DrawElement::Line {
                color: CLR_HOLE,
                radius: 1.0,
                source_x: source[0],
                source_y: source[1],
                target_x: target[0],
                target_y: target[1],
            });
            prev_point = point;
        }
        Ok(())
    }

    fn draw_bonuses<DF>(&self, tr: &ViewportTranslator, draw_element: &mut DF) where DF: FnMut(draw::DrawElement) {
        let bonuses = match &self.problem.bonuses {
            Some(bonuses) => bonuses,
            None => return,
        };
        for bonus in bonuses {
            let color = match bonus.bonus {
                ProblemBonusType::BreakALeg => CLR_BONUS_BREAK_A_LEG,
                ProblemBonusType::Globalist => CLR_BONUS_GLOBALIST,
                ProblemBonusType::Wallhack => CLR_BONUS_WALLHACK,
                ProblemBonusType::Superflex => CLR_BONUS_SUPERFLEX,
            };
            let center = tr.pos(bonus.position);
            draw_element(draw::DrawElement::Ellipse {
                color,
                x: center[0],
                y: center[1],
                width: 10.0,
                height: 10.0,
                filled: true,
            });
        }
    }

    fn edge_status(&self, index: usize) -> Option<&EdgeStatus> {
        self.check_result.as_ref()
            .and_then(|result| result.edge_statuses.get(index))
    }

    fn draw_edges<DF>(&self, tr: &ViewportTranslator, draw_element: &mut DF) -> Result<(), DrawError> where DF: FnMut(draw::DrawElement) {
        for (index, &edge) in self.problem.figure.edges.iter().enumerate() {
            let source_point = self.pose.vertices.get(edge.0)
                .ok_or(DrawError::InvalidEdgeSourceIndex { edge, index: edge.0, })?;
            let target_point = self.pose.vertices.get(edge.1)
                .ok_or(DrawError::InvalidEdgeTargetIndex { edge, index: edge.1, })?;
            let source = tr.pos(*source_point);
            let target = tr.pos(*target_point);

            // optimistic frame: green solid until the collaborator says otherwise
            let mut color = CLR_OK_EDGE;
            let mut dashed = false;
            let mut limits = None;
            if let Some(status) = self.edge_status(index) {
                if status.actual_length > status.max_length {
                    color = CLR_LONG_EDGE;
                }
                if status.actual_length < status.min_length {
                    color = CLR_SHORT_EDGE;
                }
                dashed = !status.fits_in_hole;
                if !status.length_ok() {
                    limits = Some(format!("{} ({} : {})", status.actual_length, status.min_length, status.max_length));
                }
            }

            if dashed {
                push_dashed_line(draw_element, color, 1.0, source, target);
            } else {
                draw_element(draw::DrawElement::Line {
                    color,
                    radius: 1.0,
                    source_x: source[0],
                    source_y: source[1],
                    target_x: target[0],
                    target_y: target[1],
                });
            }

            if let Some(text) = limits {
                draw_element(draw::DrawElement::Text {
                    color: CLR_EDGE_LIMITS,
                    size: 10,
                    text,
                    x: (source[0] + target[0]) / 2.0,
                    y: (source[1] + target[1]) / 2.0,
                });
            }
        }
        Ok(())
    }

    fn draw_vertices<DF>(&self, tr: &ViewportTranslator, draw_element: &mut DF) where DF: FnMut(draw::DrawElement) {
        let hovered = self.cursor.and_then(|position| self.nearby_vertex(position));
        for (index, &vertex) in self.pose.vertices.iter().enumerate() {
            let color = if self.selected.get(index).copied().unwrap_or(false) {
                CLR_SELECTED
            } else if hovered == Some(index) {
                CLR_HOVER
            } else {
                CLR_DESELECTED
            };
            let center = tr.pos(vertex);
            draw_element(draw::DrawElement::Ellipse {
                color,
                x: center[0],
                y: center[1],
                width: 6.0,
                height: 6.0,
                filled: true,
            });
        }
    }

    /// Goldilocks annuli: with exactly one vertex selected, each incident
    /// edge contributes a min-length and a max-length ellipse around its
    /// other endpoint, scaled per axis.
    fn draw_circles<DF>(&self, tr: &ViewportTranslator, draw_element: &mut DF) where DF: FnMut(draw::DrawElement) {
        if !self.show_circles {
            return;
        }
        let vertex = match self.single_selected() {
            Some(vertex) => vertex,
            None => return,
        };
        for (index, edge) in self.problem.figure.edges.iter().enumerate() {
            let other = match edge.opposite(vertex) {
                Some(other) => other,
                None => continue,
            };
            let status = match self.edge_status(index) {
                Some(status) => status,
                None => continue,
            };
            let center = match self.pose.vertices.get(other) {
                Some(&point) => tr.pos(point),
                None => continue,
            };
            for &(length, color) in &[(status.min_length, CLR_SHORT_EDGE), (status.max_length, CLR_LONG_EDGE)] {
                let radius = (length.max(0) as f64).sqrt();
                draw_element(draw::DrawElement::Ellipse {
                    color,
                    x: center[0],
                    y: center[1],
                    width: 2.0 * radius * tr.scale_x(),
                    height: 2.0 * radius * tr.scale_y(),
                    filled: false,
                });
            }
        }
    }

    fn draw_rubber_band<DF>(&self, draw_element: &mut DF) where DF: FnMut(draw::DrawElement) {
        let origin = match self.mouse {
            MouseState::RubberBanding { origin, } => origin,
            _ => return,
        };
        let position = match self.cursor {
            Some(position) => position,
            None => return,
        };
        let corners = [
            ([origin[0], origin[1]], [position[0], origin[1]]),
            ([position[0], origin[1]], [position[0], position[1]]),
            ([position[0], position[1]], [origin[0], position[1]]),
            ([origin[0], position[1]], [origin[0], origin[1]]),
        ];
        for &(source, target) in &corners {
            draw_element(draw::DrawElement::Line {
                color: CLR_RUBBER_BAND,
                radius: 0.5,
                source_x: source[0],
                source_y: source[1],
                target_x: target[0],
                target_y: target[1],
            });
        }
    }
}

fn push_dashed_line<DF>(draw_element: &mut DF, color: [f32; 4], radius: f64, source: [f64; 2], target: [f64; 2]) where DF: FnMut(draw::DrawElement) {
    const DASH: f64 = 3.0;

    let dx = target[0] - source[0];
    let dy = target[1] - source[1];
    let length = (dx * dx + dy * dy).sqrt();
    if length < std::f64::EPSILON {
        return;
    }
    let unit_x = dx / length;
    let unit_y = dy / length;

    let mut offset = 0.0;
    while offset < length {
        let end = (offset + DASH).min(length);
        draw_element(draw::DrawElement::Line {
            color,
            radius,
            source_x: source[0] + unit_x * offset,
            source_y: source[1] + unit_y * offset,
            target_x: source[0] + unit_x * end,
            target_y: source[1] + unit_y * end,
        });
        offset += DASH * 2.0;
    }
}

#[cfg(test)]
mod tests {
    use common::{
        proto::{
            EdgeStatus,
            CheckPoseResponse,
        },
        problem::{
            Edge,
            Point,
            Figure,
            Problem,
            PoseImportError,
        },
    };

    use super::{
        Env,
        Frame,
    };

    fn square_problem() -> Problem {
        Problem {
            hole: vec![Point(0, 0), Point(10, 0), Point(10, 10), Point(0, 10)],
            figure: Figure {
                edges: vec![Edge(0, 1), Edge(1, 2), Edge(2, 3), Edge(3, 0)],
                vertices: vec![Point(2, 2), Point(8, 2), Point(8, 8), Point(2, 8)],
            },
            epsilon: 0,
            bonuses: None,
        }
    }

    fn square_env() -> Env {
        Env::new(square_problem(), 640, 640, 32, 16).unwrap()
    }

    fn check_result(edge_statuses: Vec<EdgeStatus>, dislikes: i64, valid: bool) -> CheckPoseResponse {
        CheckPoseResponse {
            edge_statuses,
            dislikes,
            valid,
            edges: None,
            unlocked: None,
            bonus_metric: None,
        }
    }

    #[test]
    fn frame_padding() {
        let frame = Frame::compute(&square_problem()).unwrap();
        assert_eq!(frame, Frame { min_x: -1, min_y: -1, max_x: 12, max_y: 12, });

        let problem = square_problem();
        assert!(frame.min_x < frame.max_x);
        assert!(frame.min_y < frame.max_y);
        for point in problem.hole.iter().chain(problem.figure.vertices.iter()) {
            assert!(point.0 >= frame.min_x && point.0 < frame.max_x);
            assert!(point.1 >= frame.min_y && point.1 < frame.max_y);
        }
    }

    #[test]
    fn translator_round_trip() {
        let env = square_env();
        let tr = env.translator().unwrap();
        for grid_x in -1 .. 12 {
            for grid_y in -1 .. 12 {
                let point = Point(grid_x, grid_y);
                assert_eq!(tr.grid(tr.pos(point)), point);
            }
        }
    }

    #[test]
    fn selection_invariants() {
        let mut env = square_env();

        env.select_all();
        assert!(env.selected().iter().all(|&sel| sel));
        env.select_none();
        assert_eq!(env.selected(), &[false, false, false, false]);

        env.toggle_selection(2);
        assert_eq!(env.selected(), &[false, false, true, false]);
        env.toggle_selection(2);
        assert_eq!(env.selected(), &[false, false, false, false]);
    }

    #[test]
    fn select_rect_corner_order_independence() {
        let mut env = square_env();
        env.select_rect(Point(-1, -1), Point(11, 11));
        assert!(env.selected().iter().all(|&sel| sel));

        let mut env = square_env();
        env.select_rect(Point(11, 11), Point(-1, -1));
        assert!(env.selected().iter().all(|&sel| sel));

        let mut env = square_env();
        env.select_rect(Point(11, -1), Point(-1, 11));
        assert!(env.selected().iter().all(|&sel| sel));
    }

    #[test]
    fn select_rect_is_additive() {
        let mut env = square_env();
        env.toggle_selection(3);
        env.select_rect(Point(0, 0), Point(3, 3));
        assert_eq!(env.selected(), &[true, false, false, true]);
    }

    #[test]
    fn nudge_moves_only_selection() {
        let mut env = square_env();
        env.toggle_selection(0);
        env.toggle_selection(1);
        env.take_pose_changed();

        env.nudge_selection(1, 0);
        assert_eq!(
            env.pose().vertices,
            vec![Point(3, 2), Point(9, 2), Point(8, 8), Point(2, 8)],
        );
        assert!(env.take_pose_changed());

        env.set_shift(true);
        env.nudge_selection(0, -1);
        assert_eq!(
            env.pose().vertices,
            vec![Point(3, -8), Point(9, -8), Point(8, 8), Point(2, 8)],
        );
    }

    #[test]
    fn nudge_without_selection_is_noop() {
        let mut env = square_env();
        env.take_pose_changed();
        env.nudge_selection(1, 0);
        assert_eq!(env.pose().vertices, square_problem().figure.vertices);
        assert!(!env.take_pose_changed());
    }

    #[test]
    fn undo_restores_previous_commit() {
        let mut env = square_env();
        env.select_all();

        env.nudge_selection(1, 0);
        let after_first = env.pose().vertices.clone();
        env.nudge_selection(0, 1);
        assert_ne!(env.pose().vertices, after_first);

        env.undo();
        assert_eq!(env.pose().vertices, after_first);

        env.undo();
        assert_eq!(env.pose().vertices, square_problem().figure.vertices);

        // only the initial snapshot remains
        let initial = env.pose().vertices.clone();
        env.undo();
        assert_eq!(env.pose().vertices, initial);
    }

    #[test]
    fn click_toggles_nearby_vertex() {
        let mut env = square_env();
        let position = {
            let tr = env.translator().unwrap();
            tr.pos(Point(2, 2))
        };

        env.update_mouse_cursor(position);
        env.mouse_down();
        env.mouse_up();
        assert_eq!(env.selected(), &[true, false, false, false]);

        // plain click elsewhere replaces the selection
        let other = {
            let tr = env.translator().unwrap();
            tr.pos(Point(8, 2))
        };
        env.update_mouse_cursor(other);
        env.mouse_down();
        env.mouse_up();
        assert_eq!(env.selected(), &[false, true, false, false]);

        // ctrl-click extends it
        env.set_ctrl(true);
        env.update_mouse_cursor(position);
        env.mouse_down();
        env.mouse_up();
        assert_eq!(env.selected(), &[true, true, false, false]);
    }

    #[test]
    fn click_on_empty_space_is_noop() {
        let mut env = square_env();
        env.toggle_selection(0);
        let position = {
            let tr = env.translator().unwrap();
            tr.pos(Point(5, 5))
        };
        env.update_mouse_cursor(position);
        env.mouse_down();
        env.mouse_up();
        assert_eq!(env.selected(), &[true, false, false, false]);
    }

    #[test]
    fn drag_vertex_commits_on_release() {
        let mut env = square_env();
        env.take_pose_changed();
        let (start, target) = {
            let tr = env.translator().unwrap();
            (tr.pos(Point(2, 2)), tr.pos(Point(5, 5)))
        };

        env.update_mouse_cursor(start);
        env.mouse_down();
        env.update_mouse_cursor(target);
        assert_eq!(env.pose().vertices[0], Point(5, 5));
        // live update is optimistic, not yet committed
        assert!(!env.take_pose_changed());

        env.mouse_up();
        assert!(env.take_pose_changed());
        assert_eq!(env.pose().vertices[0], Point(5, 5));

        env.undo();
        assert_eq!(env.pose().vertices[0], Point(2, 2));
    }

    #[test]
    fn rubber_band_selects_rectangle() {
        let mut env = square_env();
        let (origin, target) = {
            let tr = env.translator().unwrap();
            (tr.pos(Point(0, 0)), tr.pos(Point(9, 3)))
        };

        env.update_mouse_cursor(origin);
        env.mouse_down();
        env.update_mouse_cursor(target);
        env.mouse_up();
        assert_eq!(env.selected(), &[true, true, false, false]);
    }

    #[test]
    fn apply_external_vertices_checks_count() {
        let mut env = square_env();
        env.take_pose_changed();

        assert_eq!(
            env.apply_external_vertices(vec![Point(0, 0)]),
            Err(PoseImportError::VertexCountMismatch { expected: 4, provided: 1, }),
        );
        assert_eq!(env.pose().vertices, square_problem().figure.vertices);
        assert!(!env.take_pose_changed());

        let moved = vec![Point(3, 3), Point(7, 3), Point(7, 7), Point(3, 7)];
        assert_eq!(env.apply_external_vertices(moved.clone()), Ok(()));
        assert_eq!(env.pose().vertices, moved);
        assert!(env.take_pose_changed());
    }

    #[test]
    fn console_text_reports_check_state() {
        let mut env = square_env();
        assert_eq!(env.console_text(), "dislikes: waiting...");

        env.set_check_result(check_result(vec![], 12, true));
        assert_eq!(env.console_text(), "dislikes: 12");

        env.set_check_result(check_result(vec![], 3, false));
        assert_eq!(env.console_text(), "dislikes: 3 (not valid)");
    }
}
