//! The editing session: owns the template, values, surfaces and workflow,
//! and drives rendering and compositing in response to user actions.

use crate::assets::loader::ImageLoader;
use crate::foundation::{
    core::Side,
    error::{InvitraError, InvitraResult},
};
use crate::render::{
    gate::RenderGate,
    mockup::MockupCompositor,
    side::SideRenderer,
    surface::Surface,
};
use crate::session::workflow::{ApprovalWorkflow, WorkflowPhase};
use crate::template::{
    model::Template,
    values::{ValueStore, custom_background_key},
};
use crate::text::shaper::TextShaper;

/// One user's editing session over a single template.
///
/// The session is the sole writer of the value store and the workflow state;
/// renderers only ever see immutable snapshots. Side surfaces are re-rendered
/// from scratch on every change, each through its own render gate so a new
/// render supersedes any unfinished one for the same surface.
pub struct EditorSession {
    template: Template,
    values: ValueStore,
    workflow: ApprovalWorkflow,
    shaper: TextShaper,
    loader: Box<dyn ImageLoader>,
    front: Surface,
    back: Option<Surface>,
    front_gate: RenderGate,
    back_gate: RenderGate,
    composite: Option<Surface>,
}

impl EditorSession {
    pub fn new(template: Template, loader: Box<dyn ImageLoader>) -> InvitraResult<Self> {
        Self::with_shaper(template, loader, TextShaper::new())
    }

    pub fn with_shaper(
        template: Template,
        loader: Box<dyn ImageLoader>,
        shaper: TextShaper,
    ) -> InvitraResult<Self> {
        template.validate()?;

        let mut values = ValueStore::new();
        values.seed_defaults(&template);

        let single_sided = template.is_single_sided();
        let front = Surface::from_size(template.size)?;
        let back = if single_sided {
            None
        } else {
            Some(Surface::from_size(template.size)?)
        };

        Ok(Self {
            workflow: ApprovalWorkflow::new(single_sided),
            values,
            shaper,
            loader,
            front,
            back,
            front_gate: RenderGate::new(),
            back_gate: RenderGate::new(),
            composite: None,
            template,
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    pub fn workflow(&self) -> &ApprovalWorkflow {
        &self.workflow
    }

    pub fn current_side(&self) -> Side {
        self.workflow.current_side()
    }

    pub fn front_surface(&self) -> &Surface {
        &self.front
    }

    pub fn back_surface(&self) -> Option<&Surface> {
        self.back.as_ref()
    }

    /// The final composite, present only while the workflow is finished.
    pub fn composite_surface(&self) -> Option<&Surface> {
        self.composite.as_ref()
    }

    /// Record a user edit. Rejected when every side owning the key is
    /// approved (locked), or after finishing.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> InvitraResult<()> {
        self.ensure_unlocked(key)?;
        self.values.set(key, value);
        Ok(())
    }

    fn ensure_unlocked(&self, key: &str) -> InvitraResult<()> {
        if self.workflow.phase() == WorkflowPhase::Finished {
            return Err(InvitraError::workflow(
                "inputs are locked after finishing; return to editing first",
            ));
        }

        let owners: Vec<Side> = [Side::Front, Side::Back]
            .into_iter()
            .filter(|&side| self.key_belongs_to(side, key))
            .collect();
        // Keys owned by no side (e.g. the global text color) stay editable
        // until the session finishes.
        if !owners.is_empty() && owners.iter().all(|&side| self.workflow.is_side_locked(side)) {
            return Err(InvitraError::workflow(format!(
                "'{key}' belongs to an approved side; its inputs are locked"
            )));
        }
        Ok(())
    }

    fn key_belongs_to(&self, side: Side, key: &str) -> bool {
        key == custom_background_key(side)
            || self.template.fields(side).iter().any(|f| f.key == key)
            || self.template.slots(side).iter().any(|s| s.key == key)
    }

    /// Re-render one side from the current value snapshot, superseding any
    /// unfinished render for that surface.
    pub fn render_side(&mut self, side: Side) -> InvitraResult<()> {
        let snapshot = self.values.snapshot();
        let ticket = match side {
            Side::Front => self.front_gate.begin(),
            Side::Back => self.back_gate.begin(),
        };

        let Self {
            template,
            shaper,
            loader,
            front,
            back,
            ..
        } = self;
        let surface = match side {
            Side::Front => front,
            Side::Back => back.as_mut().ok_or_else(|| {
                InvitraError::validation("a single-sided template has no back surface")
            })?,
        };

        let mut renderer = SideRenderer::new(loader.as_ref(), shaper);
        renderer.render(surface, template, &snapshot, side, &ticket)
    }

    /// Final front render with current values, then lock the front inputs and
    /// move to the back side.
    pub fn approve_front(&mut self) -> InvitraResult<()> {
        let mut next = self.workflow.clone();
        next.approve_front()?;
        self.render_side(Side::Front)?;
        self.workflow = next;
        Ok(())
    }

    /// Final back render with current values, then lock the back inputs.
    pub fn approve_back(&mut self) -> InvitraResult<()> {
        let mut next = self.workflow.clone();
        next.approve_back()?;
        self.render_side(Side::Back)?;
        self.workflow = next;
        Ok(())
    }

    /// Merge the rendered sides into the final composite.
    ///
    /// The approval guard is checked before any work: finishing early is
    /// rejected with a user-facing message and nothing changes. Both required
    /// sides are re-rendered with the latest values before compositing.
    #[tracing::instrument(skip(self), fields(template = %self.template.id))]
    pub fn finish(&mut self) -> InvitraResult<&Surface> {
        let mut next = self.workflow.clone();
        next.finish()?;

        self.render_side(Side::Front)?;
        if !self.template.is_single_sided() {
            self.render_side(Side::Back)?;
        }

        let compositor = MockupCompositor::new(self.loader.as_ref());
        let composite = compositor.compose(&self.front, self.back.as_ref(), &self.template)?;

        self.workflow = next;
        Ok(self.composite.insert(composite))
    }

    /// Full reset back to editing: approvals clear, inputs unlock, the
    /// composite is dropped.
    pub fn back_to_edit(&mut self) -> InvitraResult<()> {
        self.workflow.back_to_edit()?;
        self.composite = None;
        Ok(())
    }

    /// The finished artwork as a straight-alpha RGBA8 buffer plus dimensions,
    /// ready for the external export sink.
    pub fn export_rgba8(&self) -> InvitraResult<(Vec<u8>, u32, u32)> {
        let surface = self.composite.as_ref().ok_or_else(|| {
            InvitraError::workflow("nothing to export before the session is finished")
        })?;
        Ok((
            surface.to_unpremultiplied_rgba8(),
            surface.width(),
            surface.height(),
        ))
    }
}
