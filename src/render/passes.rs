use thiserror::Error;

/// Stencil reference value the primary pass writes and the outline pass
/// masks against.
pub const STENCIL_REFERENCE: u32 = 1;

/// The per-frame pass sequence, in the only order it may run.
///
/// On the GPU side the drawing stages are realized as pipeline binds inside
/// one render pass: each drawing stage carries its own immutable
/// depth/stencil configuration (see [`depth_stencil_for`]), so `Restore` has
/// no work of its own — the depth-tested, stencil-writing configuration
/// returns with the next pipeline bind. The stage still exists so the
/// sequence check covers the whole frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStage {
    Clear,
    PrimaryDraw,
    OutlineMask,
    OutlineDraw,
    Restore,
    LightMarkers,
    Present,
}

impl PassStage {
    pub const ORDER: [PassStage; 7] = [
        PassStage::Clear,
        PassStage::PrimaryDraw,
        PassStage::OutlineMask,
        PassStage::OutlineDraw,
        PassStage::Restore,
        PassStage::LightMarkers,
        PassStage::Present,
    ];
}

/// A stage was entered out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pass stage {entered:?} entered out of order, expected {expected:?}")]
pub struct PassOrderError {
    pub expected: Option<PassStage>,
    pub entered: PassStage,
}

/// Tracks progress through one frame and rejects out-of-order stage entry.
#[derive(Debug, Default)]
pub struct PassSequence {
    position: usize,
}

impl PassSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters the next stage. The stage must be exactly the successor of
    /// the previous one.
    pub fn enter(&mut self, stage: PassStage) -> Result<(), PassOrderError> {
        let expected = PassStage::ORDER.get(self.position).copied();
        if expected != Some(stage) {
            return Err(PassOrderError {
                expected,
                entered: stage,
            });
        }
        self.position += 1;
        Ok(())
    }

    /// True once every stage up to and including `Present` has run.
    pub fn is_complete(&self) -> bool {
        self.position == PassStage::ORDER.len()
    }
}

/// Depth/stencil pipeline state for each drawing stage; `None` for stages
/// that issue no draw calls.
///
/// - Primary and marker draws depth-test normally and write the stencil
///   reference everywhere they rasterize.
/// - The outline draw passes only where the stencil does NOT hold the
///   reference (masking out the object's own pixels), never writes the
///   stencil, and ignores depth so the halo is not occluded by the object.
pub fn depth_stencil_for(stage: PassStage) -> Option<wgpu::DepthStencilState> {
    let write_reference = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::Always,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Replace,
    };
    let mask_reference = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::NotEqual,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Keep,
    };

    match stage {
        PassStage::PrimaryDraw | PassStage::LightMarkers => Some(wgpu::DepthStencilState {
            format: DEPTH_STENCIL_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState {
                front: write_reference,
                back: write_reference,
                read_mask: 0xFF,
                write_mask: 0xFF,
            },
            bias: Default::default(),
        }),
        PassStage::OutlineDraw => Some(wgpu::DepthStencilState {
            format: DEPTH_STENCIL_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: wgpu::StencilState {
                front: mask_reference,
                back: mask_reference,
                read_mask: 0xFF,
                write_mask: 0x00,
            },
            bias: Default::default(),
        }),
        PassStage::Clear | PassStage::OutlineMask | PassStage::Restore | PassStage::Present => {
            None
        }
    }
}

pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_sequence_in_order_completes() {
        let mut sequence = PassSequence::new();
        for stage in PassStage::ORDER {
            sequence.enter(stage).unwrap();
        }
        assert!(sequence.is_complete());
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        let mut sequence = PassSequence::new();
        sequence.enter(PassStage::Clear).unwrap();
        let err = sequence.enter(PassStage::OutlineMask).unwrap_err();
        assert_eq!(err.expected, Some(PassStage::PrimaryDraw));
        assert_eq!(err.entered, PassStage::OutlineMask);
    }

    #[test]
    fn repeating_a_stage_is_rejected() {
        let mut sequence = PassSequence::new();
        sequence.enter(PassStage::Clear).unwrap();
        assert!(sequence.enter(PassStage::Clear).is_err());
    }

    #[test]
    fn entering_past_the_end_is_rejected() {
        let mut sequence = PassSequence::new();
        for stage in PassStage::ORDER {
            sequence.enter(stage).unwrap();
        }
        let err = sequence.enter(PassStage::Present).unwrap_err();
        assert_eq!(err.expected, None);
    }

    #[test]
    fn primary_draw_writes_the_stencil_reference() {
        let state = depth_stencil_for(PassStage::PrimaryDraw).unwrap();
        assert!(state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Less);
        assert_eq!(state.stencil.front.compare, wgpu::CompareFunction::Always);
        assert_eq!(
            state.stencil.front.pass_op,
            wgpu::StencilOperation::Replace
        );
        assert_eq!(state.stencil.write_mask, 0xFF);
    }

    #[test]
    fn outline_draw_masks_covered_pixels_and_ignores_depth() {
        let state = depth_stencil_for(PassStage::OutlineDraw).unwrap();
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);
        assert_eq!(state.stencil.front.compare, wgpu::CompareFunction::NotEqual);
        assert_eq!(state.stencil.front.pass_op, wgpu::StencilOperation::Keep);
        assert_eq!(state.stencil.write_mask, 0x00);
    }

    #[test]
    fn marker_draw_restores_the_primary_configuration() {
        let primary = depth_stencil_for(PassStage::PrimaryDraw).unwrap();
        let markers = depth_stencil_for(PassStage::LightMarkers).unwrap();
        assert_eq!(primary, markers);
    }

    #[test]
    fn non_drawing_stages_have_no_pipeline_state() {
        for stage in [
            PassStage::Clear,
            PassStage::OutlineMask,
            PassStage::Restore,
            PassStage::Present,
        ] {
            assert!(depth_stencil_for(stage).is_none());
        }
    }
}
