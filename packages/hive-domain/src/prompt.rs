use crate::passage::ScoredPassage;

pub const SYSTEM_PROMPT: &str = "\
You are a search system for document question answering. You have access to the database. \
For a complex search query the database output is limited.
So, if the given context is not enough to answer the search query, return another search action; \
otherwise answer.

Actions-Format:
@search: <query>
@answer: <ans>

For example, if the query needs details about both black holes and humans, and you only have \
information about humans, return a search about black holes.
";

const RESPONSE_FORMAT: &str = "\
====

Format to give answer:

Observation: <observation>

Thought: <thought>

Action: <action>";

/// First-hop message: the user's query, the ranked passages, and the response grammar.
pub fn primary(query: &str, passages: &[ScoredPassage]) -> String {
	format!(
		"INITIAL_QUERY: {query}\n\nOUTPUT:\n\n{context}\n\n{RESPONSE_FORMAT}",
		query = query.trim(),
		context = join_contents(passages),
	)
}

/// Follow-up message for hop `hop` (1 = the first extra search).
///
/// With `must_answer` the model is told to take the answer action; otherwise it may search again.
pub fn continuation(hop: u32, passages: &[ScoredPassage], must_answer: bool) -> String {
	let ordinal = ordinal(hop + 1);
	let instruction = if must_answer {
		"Please take the answer action, no need of further search."
	} else {
		"Answer if the context is now enough; otherwise take another search action."
	};

	format!(
		"Now, here is the output of the {ordinal} search. {instruction}\n\n{context}\n\n{RESPONSE_FORMAT}",
		context = join_contents(passages),
	)
}

/// Single-shot prompt used when the agent loop is disabled.
pub fn direct(query: &str, passages: &[ScoredPassage]) -> String {
	let mut out = String::from("Using context as reference, give the answer\ncontext:\n");

	for passage in passages {
		out.push_str("```\n");
		out.push_str(passage.passage.content.trim());
		out.push_str("\n```\n");
	}

	out.push_str("Query: ");
	out.push_str(query.trim());
	out.push_str("\nAns:\n");

	out
}

fn join_contents(passages: &[ScoredPassage]) -> String {
	passages
		.iter()
		.map(|passage| passage.passage.content.trim())
		.collect::<Vec<_>>()
		.join("\n\n")
}

fn ordinal(n: u32) -> String {
	let suffix = match (n % 10, n % 100) {
		(_, 11..=13) => "th",
		(1, _) => "st",
		(2, _) => "nd",
		(3, _) => "rd",
		_ => "th",
	};

	format!("{n}{suffix}")
}
