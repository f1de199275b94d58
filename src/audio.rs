use anyhow::anyhow;
use fyrox_sound::{
    buffer::{DataSource, SoundBufferResource, SoundBufferResourceExtension},
    context::SoundContext,
    engine::SoundEngine,
    source::{SoundSourceBuilder, Status},
};

const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Click,
    Hit,
    Miss,
    GameOver,
}

impl Cue {
    /// (start frequency Hz, end frequency Hz, length ms, gain)
    fn voice(self) -> (f32, f32, u32, f32) {
        match self {
            Cue::Click => (1400.0, 1400.0, 25, 0.15),
            Cue::Hit => (660.0, 990.0, 80, 0.3),
            Cue::Miss => (220.0, 150.0, 180, 0.3),
            Cue::GameOver => (330.0, 110.0, 600, 0.35),
        }
    }
}

/// Sine sweep with a linear fade out so the tone ends without a click.
/// Samples are mono and lie in `[-1.0, 1.0]`.
pub fn synthesize(start_hz: f32, end_hz: f32, millis: u32, sample_rate: u32) -> Vec<f32> {
    let len = (sample_rate as u64 * millis as u64 / 1000) as usize;
    let mut phase = 0.0f32;

    (0..len)
        .map(|i| {
            let t = i as f32 / len as f32;
            let freq = start_hz + (end_hz - start_hz) * t;
            phase += std::f32::consts::TAU * freq / sample_rate as f32;
            let envelope = 1.0 - t;
            phase.sin() * envelope
        })
        .collect()
}

fn cue_buffer(cue: Cue) -> anyhow::Result<SoundBufferResource> {
    let (start, end, millis, _) = cue.voice();
    let samples = synthesize(start, end, millis, SAMPLE_RATE);
    SoundBufferResource::new_generic(DataSource::Raw {
        sample_rate: SAMPLE_RATE as usize,
        channel_count: 1,
        samples,
    })
    .map_err(|_| anyhow!("failed to build {:?} cue", cue))
}

/// Short synthesized sound effects.
pub struct Sfx {
    // The engine owns the output device; dropping it silences the context
    _engine: SoundEngine,
    context: SoundContext,
    click: SoundBufferResource,
    hit: SoundBufferResource,
    miss: SoundBufferResource,
    game_over: SoundBufferResource,
}

impl Sfx {
    pub fn new() -> anyhow::Result<Self> {
        let engine = SoundEngine::new().map_err(|err| anyhow!("no audio device: {:?}", err))?;
        let context = SoundContext::new();
        engine.state().add_context(context.clone());

        Ok(Self {
            _engine: engine,
            context,
            click: cue_buffer(Cue::Click)?,
            hit: cue_buffer(Cue::Hit)?,
            miss: cue_buffer(Cue::Miss)?,
            game_over: cue_buffer(Cue::GameOver)?,
        })
    }

    pub fn play(&self, cue: Cue) {
        let buffer = match cue {
            Cue::Click => &self.click,
            Cue::Hit => &self.hit,
            Cue::Miss => &self.miss,
            Cue::GameOver => &self.game_over,
        };
        let (_, _, _, gain) = cue.voice();

        match SoundSourceBuilder::new()
            .with_buffer(buffer.clone())
            .with_status(Status::Playing)
            .with_play_once(true)
            .with_gain(gain)
            .build()
        {
            Ok(source) => {
                self.context.state().add_source(source);
            }
            Err(err) => log::warn!("failed to play {:?}: {:?}", cue, err),
        }
    }
}
